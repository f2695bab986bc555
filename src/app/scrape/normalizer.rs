//! 规范化模块
//!
//! 两件事：把商品 URL 去掉跟踪参数得到商品身份键，把价格文本解析
//! 成数值。价格解析失败不会中断请求，字段置空即可。

use url::Url;

/// 只用于跟踪的查询参数，对商品身份没有贡献
const TRACKING_PARAMS: &[&str] = &[
    "ref",
    "ref_",
    "tag",
    "th",
    "psc",
    "linkCode",
    "ascsubtag",
    "creative",
    "creativeASIN",
    "_encoding",
    "smid",
    "spm",
    "content-id",
];

/// 按前缀匹配的跟踪参数族
const TRACKING_PREFIXES: &[&str] = &["utm_", "pf_rd_", "pd_rd_"];

/// 价格文本解析错误
#[derive(Debug, thiserror::Error)]
#[error("no numeric value found in price text: {0:?}")]
pub struct PriceParseError(pub String);

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || TRACKING_PREFIXES.iter().any(|p| key.starts_with(p))
}

/// 去除跟踪参数，返回作为商品唯一身份的规范 URL
///
/// 非跟踪参数保留（部分站点用查询参数区分商品变体），fragment 丢弃。
pub fn canonicalize(raw: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(raw)?;

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !is_tracking_param(k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        drop(pairs);
    }
    url.set_fragment(None);

    Ok(url.to_string())
}

/// 把价格文本解析为数值，如 "$14.98" → 14.98
///
/// 取文本中第一段连续的数字串（允许 . 和 , 分隔），再判定小数点：
/// 最后一个分隔符后若是 1-2 位数字则视为小数点，否则整串都是千分位。
pub fn parse_price(text: &str) -> Result<f64, PriceParseError> {
    let run = first_numeric_run(text).ok_or_else(|| PriceParseError(text.to_string()))?;

    let last_sep = run.rfind(|c| c == '.' || c == ',');
    let cleaned = match last_sep {
        Some(pos) => {
            let decimals = run.len() - pos - 1;
            let is_decimal_sep = decimals >= 1 && decimals <= 2;
            let mut out = String::with_capacity(run.len());
            for (i, c) in run.char_indices() {
                match c {
                    '.' | ',' if i == pos && is_decimal_sep => out.push('.'),
                    '.' | ',' => {}
                    d => out.push(d),
                }
            }
            out
        }
        None => run,
    };

    cleaned
        .parse::<f64>()
        .map_err(|_| PriceParseError(text.to_string()))
}

/// 返回第一段仅由数字与分隔符构成、且至少含一个数字的子串
fn first_numeric_run(text: &str) -> Option<String> {
    let mut run = String::new();
    let mut has_digit = false;

    for c in text.chars() {
        if c.is_ascii_digit() {
            run.push(c);
            has_digit = true;
        } else if (c == '.' || c == ',') && has_digit {
            run.push(c);
        } else if has_digit {
            break;
        } else {
            run.clear();
        }
    }

    // 去掉结尾悬挂的分隔符，如 "14." 或 "99,"
    while run.ends_with('.') || run.ends_with(',') {
        run.pop();
    }

    if has_digit {
        Some(run)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalize_strips_tracking_params() {
        assert_eq!(
            canonicalize("https://x/dp/ABC?ref=xyz&tag=123").unwrap(),
            "https://x/dp/ABC"
        );
    }

    #[test]
    fn canonicalize_keeps_non_tracking_params() {
        assert_eq!(
            canonicalize("https://x/dp/ABC?variant=red&utm_source=mail").unwrap(),
            "https://x/dp/ABC?variant=red"
        );
    }

    #[test]
    fn canonicalize_strips_prefix_families_and_fragment() {
        assert_eq!(
            canonicalize("https://www.amazon.com/dp/B07RJ18VMF?pf_rd_p=a&pd_rd_w=b#reviews")
                .unwrap(),
            "https://www.amazon.com/dp/B07RJ18VMF"
        );
    }

    #[test]
    fn canonicalize_rejects_garbage() {
        assert!(canonicalize("not a url").is_err());
    }

    #[test]
    fn parse_price_dollar() {
        assert_eq!(parse_price("$14.98").unwrap(), 14.98);
    }

    #[test]
    fn parse_price_no_digits_fails() {
        assert!(parse_price("free").is_err());
        assert!(parse_price("").is_err());
    }

    #[test]
    fn parse_price_thousands_separators() {
        assert_eq!(parse_price("$1,299").unwrap(), 1299.0);
        assert_eq!(parse_price("1.299,50 €").unwrap(), 1299.50);
        assert_eq!(parse_price("MXN 12,345.67").unwrap(), 12345.67);
    }

    #[test]
    fn parse_price_takes_first_number() {
        assert_eq!(parse_price("Was $29.99, now $19.99").unwrap(), 29.99);
    }

    #[test]
    fn parse_price_trailing_separator() {
        assert_eq!(parse_price("99,- kr").unwrap(), 99.0);
    }
}
