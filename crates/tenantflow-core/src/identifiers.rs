//! ユニット名からの識別子導出
//!
//! `SecondCustomer` のようなユニット名から、プロジェクトIDなどに使う
//! ハイフン区切りの slug (`second-customer`) と、サービスアカウントIDに使う
//! 連結形の token (`secondcustomer`) を導出する。

use serde::{Deserialize, Serialize};

/// ユニット名から導出された識別子
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifiers {
    /// ハイフン区切りの小文字識別子
    pub slug: String,

    /// 区切りなしの小文字識別子
    pub token: String,
}

impl Identifiers {
    pub fn is_empty(&self) -> bool {
        self.slug.is_empty()
    }
}

/// ユニット名から slug と token を導出
///
/// 境界は「ASCII英字の直後にASCII大文字が続く位置」。slug ではそこに `-`
/// を挿入し、token では何も挿入しない。最後に全体を小文字化する。
/// 数字や記号は境界を作らず、そのまま残る。
///
/// ```
/// use tenantflow_core::derive;
///
/// let ids = derive("SecondCustomer");
/// assert_eq!(ids.slug, "second-customer");
/// assert_eq!(ids.token, "secondcustomer");
/// ```
pub fn derive(unit_name: &str) -> Identifiers {
    Identifiers {
        slug: split_at_boundaries(unit_name, Some('-')),
        token: split_at_boundaries(unit_name, None),
    }
}

fn split_at_boundaries(name: &str, separator: Option<char>) -> String {
    let mut out = String::with_capacity(name.len() + name.len() / 4);
    let mut chars = name.chars().peekable();

    while let Some(c) = chars.next() {
        out.push(c);
        if let Some(sep) = separator
            && c.is_ascii_alphabetic()
            && chars.peek().is_some_and(|next| next.is_ascii_uppercase())
        {
            out.push(sep);
        }
    }

    out.to_lowercase()
}
