use crate::config::resolve;
use crate::table::Table;
use chatter_core::common::time::parse_timestamp;
use chatter_core::config::MergeConfig;
use chatter_core::price::entity::PriceSample;
use chatter_core::store::error::StoreError;
use chatter_core::store::port::PriceStore;
use std::path::Path;
use tracing::info;

const PRICE_TABLE: &str = "prices";

/// PriceStore 的 CSV 实现。
///
/// # Summary
/// 价格表的列名可配置：资产代码列、时间列、价格列，以及可选的成交量列。
///
/// # Invariants
/// * 前三列为必需列，缺失时返回 `SchemaMismatch`。
/// * 只解析目标资产的行；这些行的时间或价格无法解析时返回带行号的 `Parse`。
#[derive(Debug, Clone)]
pub struct CsvPriceStore {
    symbol_column: String,
    time_column: String,
    price_column: String,
    volume_column: String,
}

impl CsvPriceStore {
    pub fn from_config(config: &MergeConfig) -> Self {
        Self {
            symbol_column: config.symbol_column.clone(),
            time_column: config.time_column.clone(),
            price_column: config.price_column.clone(),
            volume_column: config.volume_column.clone(),
        }
    }
}

impl Default for CsvPriceStore {
    fn default() -> Self {
        Self::from_config(&MergeConfig::default())
    }
}

fn parse_error(line: u64, column: &str, value: &str) -> StoreError {
    StoreError::Parse {
        line,
        message: format!("invalid `{column}` value `{value}`"),
    }
}

impl PriceStore for CsvPriceStore {
    /// # Summary
    /// 读取价格表并过滤到单一资产。
    ///
    /// # Logic
    /// 1. 校验资产代码、时间、价格三列存在。
    /// 2. 资产代码与 `symbol` 精确相等的行才被保留。
    /// 3. 时间接受 UNIX 秒、RFC 3339、`YYYY-MM-DD HH:MM:SS` 与 `YYYY-MM-DD`。
    /// 4. 成交量列缺失或无法解析时为 None。
    fn load_prices(&self, path: &Path, symbol: &str) -> Result<Vec<PriceSample>, StoreError> {
        let path = resolve(path);
        let required = [
            self.symbol_column.as_str(),
            self.time_column.as_str(),
            self.price_column.as_str(),
        ];
        let table = Table::read(&path, PRICE_TABLE, &required)?;

        let mut samples = Vec::new();
        for row in &table.rows {
            if table.cell(row, &self.symbol_column).map(str::trim) != Some(symbol) {
                continue;
            }

            let time_cell = table.cell(row, &self.time_column).unwrap_or_default();
            let time = parse_timestamp(time_cell)
                .ok_or_else(|| parse_error(row.line, &self.time_column, time_cell))?;

            let price_cell = table.cell(row, &self.price_column).unwrap_or_default();
            let price = price_cell
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|p| p.is_finite())
                .ok_or_else(|| parse_error(row.line, &self.price_column, price_cell))?;

            let volume = table
                .cell(row, &self.volume_column)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite());

            samples.push(PriceSample {
                symbol: symbol.to_string(),
                time,
                price,
                volume,
            });
        }

        info!(
            path = %path.display(),
            symbol,
            rows = table.rows.len(),
            loaded = samples.len(),
            "Loaded price series"
        );
        Ok(samples)
    }
}
