// ==========================================
// 门店活动导入系统 - 文件解析器实现
// ==========================================
// 支持: CSV (.csv) / Excel (.xlsx/.xls)
// 输出: Vec<RawRow>（表头行不计入，完全空白的行丢弃）
// ==========================================

use crate::domain::import::{CellValue, RawRow};
use crate::domain::types::FileFormat;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::import_trait::FileParser;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

// ==========================================
// CSV Parser 实现
// ==========================================
// 规则: 逗号分隔、不识别引号（引号内的逗号同样拆分）；去除首尾空白与引号
// 规则: 第一条非空白记录为表头；数据行缺失的尾部值补空串
pub struct CsvParser;

impl CsvParser {
    fn clean_cell(raw: &str) -> String {
        raw.trim().trim_matches('"').trim().to_string()
    }
}

impl FileParser for CsvParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<Vec<RawRow>> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| ImportError::DecodeError(format!("CSV não está em UTF-8: {}", e)))?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        // 读取全部记录，丢弃完全空白的记录
        let mut lines: Vec<Vec<String>> = Vec::new();
        for result in reader.records() {
            let record = result?;
            let cells: Vec<String> = record.iter().map(Self::clean_cell).collect();
            if cells.iter().any(|cell| !cell.is_empty()) {
                lines.push(cells);
            }
        }

        let mut lines = lines.into_iter();
        let headers = lines
            .next()
            .ok_or(ImportError::InsufficientRows { found: 0 })?;

        let records: Vec<RawRow> = lines
            .map(|values| {
                // 缺失的尾部值补空串；多余的值丢弃
                headers
                    .iter()
                    .enumerate()
                    .map(|(idx, header)| {
                        let value = values.get(idx).cloned().unwrap_or_default();
                        (header.clone(), CellValue::Text(value))
                    })
                    .collect::<RawRow>()
            })
            .filter(|row| !row.is_blank())
            .collect();

        if records.is_empty() {
            return Err(ImportError::InsufficientRows { found: 1 });
        }

        debug!(headers = headers.len(), rows = records.len(), "CSV 解析完成");
        Ok(records)
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
// 规则: 仅读取第一个工作表；第一行为表头；空单元格默认 Blank
pub struct ExcelParser;

impl ExcelParser {
    fn convert_cell(cell: &Data) -> CellValue {
        match cell {
            Data::Empty => CellValue::Blank,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Bool(b) => CellValue::Bool(*b),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl FileParser for ExcelParser {
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<Vec<RawRow>> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        // 读取第一个 sheet
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names.first().cloned().ok_or(ImportError::NoWorksheet)?;

        let range = workbook.worksheet_range(&sheet_name)?;

        // 丢弃完全空白的行后再判断是否有数据
        let grid: Vec<Vec<CellValue>> = range
            .rows()
            .map(|row| row.iter().map(Self::convert_cell).collect::<Vec<_>>())
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .collect();

        if grid.len() < 2 {
            return Err(ImportError::InsufficientRows { found: grid.len() });
        }

        // 提取表头（第一行）
        let headers: Vec<String> = grid[0]
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut records = Vec::new();
        for data_row in &grid[1..] {
            let row: RawRow = headers
                .iter()
                .enumerate()
                .map(|(idx, header)| {
                    let value = data_row.get(idx).cloned().unwrap_or(CellValue::Blank);
                    (header.clone(), value)
                })
                .collect();

            if row.is_blank() {
                continue;
            }

            records.push(row);
        }

        debug!(sheet = %sheet_name, rows = records.len(), "工作表解析完成");
        Ok(records)
    }
}

// ==========================================
// 通用文件解析器（根据声明格式/扩展名选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    /// 按声明格式解析字节内容
    pub fn parse(&self, bytes: &[u8], format: FileFormat) -> ImportResult<Vec<RawRow>> {
        match format {
            FileFormat::Csv => CsvParser.parse_bytes(bytes),
            FileFormat::Xlsx | FileFormat::Xls => ExcelParser.parse_bytes(bytes),
        }
    }

    /// 按文件名扩展名选择格式后解析
    pub fn parse_named(&self, file_name: &str, bytes: &[u8]) -> ImportResult<Vec<RawRow>> {
        let format = FileFormat::from_file_name(file_name)
            .ok_or_else(|| ImportError::UnsupportedFormat(file_name.to_string()))?;
        self.parse(bytes, format)
    }

    /// 读取磁盘文件并解析
    pub fn parse_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<RawRow>> {
        let path = file_path.as_ref();
        let file_name = path.display().to_string();

        let format = FileFormat::from_file_name(&file_name)
            .ok_or_else(|| ImportError::UnsupportedFormat(file_name.clone()))?;

        if !path.exists() {
            return Err(ImportError::FileReadError(format!(
                "arquivo não encontrado: {}",
                file_name
            )));
        }

        let bytes = std::fs::read(path)?;
        self.parse(&bytes, format)
    }
}

/// 首行表头（按列顺序）
pub fn headers_of(rows: &[RawRow]) -> Vec<String> {
    rows.first()
        .map(|row| row.headers().map(str::to_string).collect())
        .unwrap_or_default()
}
