use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static ROOT_DIR: OnceLock<PathBuf> = OnceLock::new();

/// 设置存储层的数据根目录。
///
/// # Logic
/// 1. 尝试将指定的路径保存到全局静态变量中。
/// 2. 如果已经设置过，则本次设置无效。
///
/// # Arguments
/// * `path` - 存放表格文件的根目录。
///
/// # Returns
/// * 本次设置是否生效。
pub fn set_root_dir(path: PathBuf) -> bool {
    ROOT_DIR.set(path).is_ok()
}

/// 获取当前配置的数据根目录，未设置时为 "data"。
pub fn get_root_dir() -> PathBuf {
    ROOT_DIR
        .get()
        .cloned()
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// 相对路径基于数据根目录解析，绝对路径原样使用。
pub(crate) fn resolve(path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        get_root_dir().join(path)
    }
}

/// # Summary
/// 计算写出文件的实际路径。
///
/// # Logic
/// 1. 按 `resolve` 解析根目录。
/// 2. 文件名不以 `.csv` 结尾时追加该后缀 (`raw` → `raw.csv`，`raw.txt` → `raw.txt.csv`)。
pub(crate) fn resolve_output(path: &Path) -> PathBuf {
    let resolved = resolve(path);
    let is_csv = resolved
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        return resolved;
    }
    let mut name = resolved.into_os_string();
    name.push(".csv");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_output_appends_extension() {
        let base = Path::new("/tmp/chatter");
        assert_eq!(resolve_output(&base.join("raw")), base.join("raw.csv"));
        assert_eq!(resolve_output(&base.join("raw.csv")), base.join("raw.csv"));
        assert_eq!(resolve_output(&base.join("raw.txt")), base.join("raw.txt.csv"));
    }

    #[test]
    fn test_absolute_paths_bypass_root() {
        let absolute = Path::new("/var/tmp/prices.csv");
        assert_eq!(resolve(absolute), absolute.to_path_buf());
    }
}
