//! Excel 导出

use crate::columns::{Cell, RecordSchema};
use asthma_core::{AsthmaError, AssessmentRecord, Result};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::Path;
use tracing::info;

pub const SHEET_NAME: &str = "Records";

fn export_error(e: XlsxError) -> AsthmaError {
    AsthmaError::Export(e.to_string())
}

fn build_workbook(schema: &RecordSchema, records: &[AssessmentRecord]) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME).map_err(export_error)?;

    for (col, title) in schema.header().into_iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, title, &header_format)
            .map_err(export_error)?;
    }

    for (idx, record) in records.iter().enumerate() {
        let row = (idx + 1) as u32;
        for (col, cell) in schema.cells(record).into_iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(text) => {
                    worksheet.write_string(row, col, text).map_err(export_error)?;
                }
                Cell::Number(value) => {
                    worksheet.write_number(row, col, value).map_err(export_error)?;
                }
                Cell::Empty => {}
            }
        }
    }

    Ok(workbook)
}

/// 写入 xlsx 文件，返回写入的记录数
pub fn export_to_path(
    schema: &RecordSchema,
    records: &[AssessmentRecord],
    path: impl AsRef<Path>,
) -> Result<usize> {
    let path = path.as_ref();
    let mut workbook = build_workbook(schema, records)?;
    workbook.save(path).map_err(export_error)?;

    info!("Exported {} records to {}", records.len(), path.display());
    Ok(records.len())
}

/// 生成 xlsx 字节，用于下载
pub fn export_to_buffer(schema: &RecordSchema, records: &[AssessmentRecord]) -> Result<Vec<u8>> {
    let mut workbook = build_workbook(schema, records)?;
    workbook.save_to_buffer().map_err(export_error)
}
