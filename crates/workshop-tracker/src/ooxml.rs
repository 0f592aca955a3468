//! Minimal Office Open XML packages (xlsx workbook, docx document)
//!
//! Parts are written as plain XML strings into a deflated zip. Only the parts
//! Excel/Word/LibreOffice require are emitted: content types, package rels,
//! and the workbook (or document) itself.

use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::export::{Cell, ExportError, ExportView};

const XML_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const SHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Style indexes into `cellXfs` in styles.xml
const STYLE_DEFAULT: u32 = 0;
const STYLE_CURRENCY: u32 = 1;
const STYLE_BOLD: u32 = 2;
const STYLE_PERCENT: u32 = 3;

struct Package {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl Package {
    fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default().compression_method(CompressionMethod::Deflated),
        }
    }

    fn part(&mut self, name: &str, xml: &str) -> Result<(), ExportError> {
        self.zip.start_file(name, self.options)?;
        self.zip.write_all(XML_HEADER.as_bytes())?;
        self.zip.write_all(xml.as_bytes())?;
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, ExportError> {
        Ok(self.zip.finish()?.into_inner())
    }
}

// =============================================================================
// xlsx
// =============================================================================

/// Workbook with a "Summary" sheet (metadata and totals) and a "Data" sheet
pub fn xlsx(view: &ExportView) -> Result<Vec<u8>, ExportError> {
    let mut pkg = Package::new();

    pkg.part(
        "[Content_Types].xml",
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#,
    )?;
    pkg.part(
        "_rels/.rels",
        &format!(
            r#"<Relationships xmlns="{PKG_REL_NS}"><Relationship Id="rId1" Type="{REL_NS}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
        ),
    )?;
    pkg.part(
        "xl/workbook.xml",
        &format!(
            r#"<workbook xmlns="{SHEET_NS}" xmlns:r="{REL_NS}"><sheets><sheet name="Summary" sheetId="1" r:id="rId1"/><sheet name="Data" sheetId="2" r:id="rId2"/></sheets></workbook>"#
        ),
    )?;
    pkg.part(
        "xl/_rels/workbook.xml.rels",
        &format!(
            r#"<Relationships xmlns="{PKG_REL_NS}"><Relationship Id="rId1" Type="{REL_NS}/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="{REL_NS}/worksheet" Target="worksheets/sheet2.xml"/><Relationship Id="rId3" Type="{REL_NS}/styles" Target="styles.xml"/></Relationships>"#
        ),
    )?;
    pkg.part("xl/styles.xml", &styles())?;
    pkg.part("xl/worksheets/sheet1.xml", &summary_sheet(view))?;
    pkg.part("xl/worksheets/sheet2.xml", &data_sheet(view))?;

    pkg.finish()
}

fn styles() -> String {
    format!(
        concat!(
            r#"<styleSheet xmlns="{ns}">"#,
            r#"<numFmts count="2"><numFmt numFmtId="164" formatCode="$#,##0.00"/><numFmt numFmtId="165" formatCode="0.0&quot;%&quot;"/></numFmts>"#,
            r#"<fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts>"#,
            r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
            r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
            r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
            r#"<cellXfs count="4">"#,
            r#"<xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#,
            r#"<xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>"#,
            r#"<xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/>"#,
            r#"<xf numFmtId="165" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>"#,
            r#"</cellXfs>"#,
            r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
            r#"</styleSheet>"#
        ),
        ns = SHEET_NS
    )
}

/// Spreadsheet column letters: 0 -> A, 25 -> Z, 26 -> AA
fn column_name(mut index: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

fn text_cell(reference: &str, text: &str, style: u32) -> String {
    format!(
        r#"<c r="{reference}" s="{style}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
        escape(text)
    )
}

fn number_cell(reference: &str, value: f64, style: u32) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    format!(r#"<c r="{reference}" s="{style}"><v>{value}</v></c>"#)
}

fn cell_xml(reference: &str, cell: &Cell) -> String {
    match cell {
        Cell::Currency(v) => number_cell(reference, *v, STYLE_CURRENCY),
        Cell::Number(v) => number_cell(reference, *v, STYLE_DEFAULT),
        Cell::Integer(v) => number_cell(reference, *v as f64, STYLE_DEFAULT),
        Cell::Percent(Some(p)) => number_cell(reference, *p, STYLE_PERCENT),
        Cell::Text(_) | Cell::Date(_) | Cell::Percent(None) => {
            text_cell(reference, &cell.display(), STYLE_DEFAULT)
        }
    }
}

fn sheet(rows: &[String]) -> String {
    format!(
        r#"<worksheet xmlns="{SHEET_NS}"><sheetData>{}</sheetData></worksheet>"#,
        rows.concat()
    )
}

fn row_xml(number: usize, cells: &[String]) -> String {
    format!(r#"<row r="{number}">{}</row>"#, cells.concat())
}

fn summary_sheet(view: &ExportView) -> String {
    let mut rows = Vec::new();
    let mut push = |label: &str, value: String| {
        let n = rows.len() + 1;
        rows.push(row_xml(n, &[text_cell(&format!("A{n}"), label, STYLE_BOLD), value]));
    };

    push("Report", text_cell("B1", &view.title, STYLE_DEFAULT));
    push("Exported", text_cell("B2", &view.exported_at(), STYLE_DEFAULT));

    let mut n = 3;
    for (name, value) in &view.filters {
        push(&format!("Filter: {name}"), text_cell(&format!("B{n}"), value, STYLE_DEFAULT));
        n += 1;
    }
    for (label, value) in &view.summary {
        push(label, cell_xml(&format!("B{n}"), value));
        n += 1;
    }

    sheet(&rows)
}

fn data_sheet(view: &ExportView) -> String {
    let mut rows = Vec::with_capacity(view.rows.len() + 1);

    let header: Vec<String> = view
        .columns
        .iter()
        .enumerate()
        .map(|(c, name)| text_cell(&format!("{}1", column_name(c)), name, STYLE_BOLD))
        .collect();
    rows.push(row_xml(1, &header));

    for (r, row) in view.rows.iter().enumerate() {
        let n = r + 2;
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(c, cell)| cell_xml(&format!("{}{n}", column_name(c)), cell))
            .collect();
        rows.push(row_xml(n, &cells));
    }

    sheet(&rows)
}

// =============================================================================
// docx
// =============================================================================

/// Document with a title, summary paragraphs and one table
pub fn docx(view: &ExportView) -> Result<Vec<u8>, ExportError> {
    let mut pkg = Package::new();

    pkg.part(
        "[Content_Types].xml",
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#,
    )?;
    pkg.part(
        "_rels/.rels",
        &format!(
            r#"<Relationships xmlns="{PKG_REL_NS}"><Relationship Id="rId1" Type="{REL_NS}/officeDocument" Target="word/document.xml"/></Relationships>"#
        ),
    )?;
    pkg.part("word/document.xml", &document(view))?;

    pkg.finish()
}

fn paragraph(text: &str, bold: bool, size_half_points: Option<u32>) -> String {
    let mut props = String::new();
    if bold {
        props.push_str("<w:b/>");
    }
    if let Some(size) = size_half_points {
        props.push_str(&format!(r#"<w:sz w:val="{size}"/>"#));
    }
    format!(
        r#"<w:p><w:r><w:rPr>{props}</w:rPr><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        escape(text)
    )
}

fn table_cell(text: &str, bold: bool) -> String {
    format!(
        r#"<w:tc><w:tcPr><w:tcW w:w="0" w:type="auto"/></w:tcPr>{}</w:tc>"#,
        paragraph(text, bold, None)
    )
}

fn document(view: &ExportView) -> String {
    let mut body = String::new();

    body.push_str(&paragraph(&view.title, true, Some(32)));
    body.push_str(&paragraph(&format!("Exported: {}", view.exported_at()), false, None));
    for (name, value) in &view.filters {
        body.push_str(&paragraph(&format!("{name}: {value}"), false, None));
    }
    for (label, value) in &view.summary {
        body.push_str(&paragraph(&format!("{label}: {}", value.display()), true, None));
    }

    let border = r#"w:val="single" w:sz="4" w:space="0" w:color="999999""#;
    body.push_str(&format!(
        r#"<w:tbl><w:tblPr><w:tblW w:w="5000" w:type="pct"/><w:tblBorders><w:top {border}/><w:left {border}/><w:bottom {border}/><w:right {border}/><w:insideH {border}/><w:insideV {border}/></w:tblBorders></w:tblPr>"#
    ));
    body.push_str("<w:tr>");
    for column in &view.columns {
        body.push_str(&table_cell(column, true));
    }
    body.push_str("</w:tr>");
    for row in &view.rows {
        body.push_str("<w:tr>");
        for cell in row {
            body.push_str(&table_cell(&cell.display(), false));
        }
        body.push_str("</w:tr>");
    }
    body.push_str("</w:tbl>");

    // Word requires a paragraph after a table at the end of the body
    body.push_str("<w:p/>");

    format!(r#"<w:document xmlns:w="{WORD_NS}"><w:body>{body}</w:body></w:document>"#)
}
