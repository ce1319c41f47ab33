use itertools::Itertools;

use crate::bencode::{Dictionary, Value};
use crate::torrent::info_hash::InfoHash;

/// Build a magnet URI for the torrent.
///
/// Trackers come from `announce` followed by `announce-list`, deduplicated in encounter order.
/// Returns `None` when there is no infohash.
#[must_use]
pub fn build_magnet(torrent: &Dictionary, info_hash: Option<&InfoHash>, display_name: &str) -> Option<String> {
    let info_hash = info_hash?;

    let mut params = vec![format!(
        "xt={}",
        encode_keeping_colons(&format!("urn:{}:{}", info_hash.scheme(), info_hash.as_str()))
    )];

    if !display_name.is_empty() {
        params.push(format!("dn={}", urlencoding::encode(display_name)));
    }

    params.extend(
        trackers(torrent)
            .iter()
            .map(|tracker| format!("tr={}", urlencoding::encode(tracker))),
    );

    Some(format!("magnet:?{}", params.join("&")))
}

/// Tracker URLs in encounter order with duplicates and empty entries removed.
#[must_use]
pub fn trackers(torrent: &Dictionary) -> Vec<String> {
    let announce = torrent
        .get(b"announce".as_slice())
        .and_then(Value::as_text_ignoring_invalid);

    let announce_list = torrent
        .get(b"announce-list".as_slice())
        .and_then(Value::as_list)
        .into_iter()
        .flatten()
        .flat_map(|tier| match tier {
            Value::List(urls) => urls.iter().collect::<Vec<_>>(),
            Value::Bytes(_) => vec![tier],
            _ => Vec::new(),
        })
        .filter_map(Value::as_text_ignoring_invalid);

    announce
        .into_iter()
        .chain(announce_list)
        .filter(|tracker| !tracker.is_empty())
        .unique()
        .collect()
}

fn encode_keeping_colons(text: &str) -> String {
    text.split(':').map(urlencoding::encode).join(":")
}
