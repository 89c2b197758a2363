// ==========================================
// 门店活动导入系统 - 导入模板
// ==========================================
// 表头与标准字段一一对应，可被自动识别
// ==========================================

use crate::importer::error::ImportResult;
use std::io::Write;
use std::path::Path;

pub const TEMPLATE_HEADERS: [&str; 5] =
    ["nome_loja", "endereco_principal", "regional", "bandeira", "ativo"];

// 示例地址不含逗号（CSV 解析器按逗号直接拆分）
const TEMPLATE_ROWS: [[&str; 5]; 3] = [
    ["Loja Centro", "Rua das Flores 123", "Regional Sul", "Pão de Açúcar", "true"],
    ["Loja Norte Shopping", "Av. Principal 456", "Regional Norte", "Extra Hiper", "true"],
    ["Loja Oeste", "Rua Comercial 789", "Regional Oeste", "Mercado Extra", "false"],
];

/// 写出门店模板 CSV
pub fn write_store_template<W: Write>(writer: W) -> ImportResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(TEMPLATE_HEADERS)?;
    for row in TEMPLATE_ROWS {
        csv_writer.write_record(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// 写出模板到文件
pub fn write_store_template_file<P: AsRef<Path>>(path: P) -> ImportResult<()> {
    let file = std::fs::File::create(path)?;
    write_store_template(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::FileFormat;
    use crate::importer::column_mapper::ColumnMapper;
    use crate::importer::file_parser::{headers_of, UniversalFileParser};

    #[test]
    fn test_template_headers_map_to_all_fields() {
        let mut buffer = Vec::new();
        write_store_template(&mut buffer).unwrap();

        let rows = UniversalFileParser.parse(&buffer, FileFormat::Csv).unwrap();
        assert_eq!(rows.len(), 3);

        let mapping = ColumnMapper.detect_mapping(&headers_of(&rows));
        assert_eq!(mapping.mapped_count(), 5);
    }

    #[test]
    fn test_template_first_line_is_header() {
        let mut buffer = Vec::new();
        write_store_template(&mut buffer).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text.lines().next(),
            Some("nome_loja,endereco_principal,regional,bandeira,ativo")
        );
    }
}
