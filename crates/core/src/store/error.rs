use thiserror::Error;

/// # Summary
/// 表格持久化错误枚举。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - `SchemaMismatch` 直接上抛给调用方，不做恢复。
#[derive(Error, Debug)]
pub enum StoreError {
    /// 文件读写失败
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// CSV 编解码失败
    #[error("CSV error: {0}")]
    Csv(String),
    /// 表缺少必需列
    #[error("Table `{table}` is missing required columns: {}", missing.join(", "))]
    SchemaMismatch { table: String, missing: Vec<String> },
    /// 单元格内容无法解析
    #[error("Parse error at line {line}: {message}")]
    Parse { line: u64, message: String },
}
