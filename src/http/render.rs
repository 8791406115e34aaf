//! Search result rendering.
//!
//! Two wire formats: the plain-text report (default) and a JSON payload
//! selected with `json=1`.

use serde::Serialize;

use crate::search::SearchResult;

/// JSON form of a search response.
#[derive(Debug, Serialize)]
pub struct SearchPayload<'a> {
    pub err_code: i32,
    pub err_msg: &'a str,
    #[serde(rename = "totalNum")]
    pub total_num: usize,
    #[serde(rename = "totalPV")]
    pub total_pv: u64,
    pub data: Vec<WireEntry<'a>>,
}

#[derive(Debug, Serialize)]
pub struct WireEntry<'a> {
    #[serde(rename = "Key")]
    pub url: &'a str,
    #[serde(rename = "Value")]
    pub count: u64,
}

/// `Total Num:<n> Total PV:<pv>` followed by one `url<TAB>count` per line.
pub fn text(result: &SearchResult) -> String {
    let lines: Vec<String> = result
        .data
        .iter()
        .map(|e| format!("{}\t{}", e.url, e.count))
        .collect();

    format!(
        "Total Num:{} Total PV:{}\n{}",
        result.total_num,
        result.total_pv,
        lines.join("\n")
    )
}

pub fn json(result: &SearchResult) -> SearchPayload<'_> {
    SearchPayload {
        err_code: 0,
        err_msg: "",
        total_num: result.total_num,
        total_pv: result.total_pv,
        data: result
            .data
            .iter()
            .map(|e| WireEntry {
                url: &e.url,
                count: e.count,
            })
            .collect(),
    }
}
