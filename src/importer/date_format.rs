// ==========================================
// 学生选课数据导入系统 - 日期多格式解析
// ==========================================
// 职责: 按候选格式顺序解析日期,首个成功者生效
// 说明: 纯函数组合,每个格式可独立测试
// ==========================================

use chrono::NaiveDate;

/// 日期格式候选,按优先级排列
///
/// 顺序敏感: DD/MM/YYYY 先于 MM/DD/YYYY,
/// 歧义值(如 03/04/2021)按前者解释
pub const DATE_FORMAT_CANDIDATES: [&str; 4] = [
    "%Y-%m-%d", // ISO: 2021-04-03
    "%d/%m/%Y", // 2021年4月3日 → 03/04/2021
    "%m/%d/%Y", // 美式: 04/03/2021
    "%Y.%m.%d", // 2021.04.03
];

/// 按单一格式解析(候选链的基本单元)
pub fn parse_date_with_format(value: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, format).ok()
}

/// 依次尝试全部候选格式,返回首个成功解析的日期
///
/// # 返回
/// - Some(NaiveDate): 任一格式解析成功
/// - None: 全部候选失败(调用方据此判行无效)
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMAT_CANDIDATES
        .iter()
        .find_map(|format| parse_date_with_format(value, format))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_iso_format() {
        assert_eq!(parse_date("2021-04-03"), Some(ymd(2021, 4, 3)));
    }

    #[test]
    fn test_parse_day_first_format() {
        assert_eq!(parse_date("03/04/2021"), Some(ymd(2021, 4, 3)));
    }

    #[test]
    fn test_parse_month_first_fallback() {
        // 日位超过 12 时 DD/MM/YYYY 失败,回落到 MM/DD/YYYY
        assert_eq!(parse_date("04/13/2021"), Some(ymd(2021, 4, 13)));
    }

    #[test]
    fn test_parse_dotted_format() {
        assert_eq!(parse_date("2021.04.03"), Some(ymd(2021, 4, 3)));
    }

    #[test]
    fn test_ambiguous_value_prefers_day_first() {
        // 首个成功的候选生效
        assert_eq!(parse_date("05/06/2021"), Some(ymd(2021, 6, 5)));
    }

    #[test]
    fn test_parse_invalid_date() {
        // 不存在的日月组合
        assert_eq!(parse_date("2020-13-40"), None);
        assert_eq!(parse_date("not-a-date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_parse_with_single_format() {
        assert_eq!(
            parse_date_with_format("2021-04-03", "%Y-%m-%d"),
            Some(ymd(2021, 4, 3))
        );
        assert_eq!(parse_date_with_format("2021-04-03", "%d/%m/%Y"), None);
    }
}
