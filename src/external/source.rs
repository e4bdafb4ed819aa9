//! Network fetch + on-disk cache for the CAIDA-shaped artifacts behind
//! `Bgp`/`As2Org` (§6). Grounded on `as_graph_generators/caida.rs`'s
//! `CAIDAASGraphCollector`: same dated-filename cache check, same
//! `reqwest::blocking` + `bzip2` download/decompress path. The AS2Org
//! dataset's directory listing isn't predictably dated, so its fetch path
//! scrapes the index page for the newest matching link instead of
//! constructing a filename directly (the corpus already carries `scraper`
//! for exactly this kind of HTML parsing).

use std::fs;
use std::io::Read as _;
use std::path::{Path, PathBuf};

use bzip2::read::BzDecoder;
use chrono::{Duration, Utc};
use scraper::{Html, Selector};

use crate::shared::AdapterLoadError;

const AS_REL2_INDEX_URL: &str = "https://publicdata.caida.org/datasets/as-relationships/serial-2/";
const AS2ORG_INDEX_URL: &str = "https://publicdata.caida.org/datasets/as-organizations/";

fn to_load_err(context: &str, e: impl std::fmt::Display) -> AdapterLoadError {
    AdapterLoadError(format!("{context}: {e}"))
}

/// Download `url`, decompress if it ends in `.bz2`, and write the plain
/// text to `dest`. A pre-existing `dest` is returned without refetching —
/// the same "cached path wins" check as `CAIDAASGraphCollector::run`.
fn fetch_cached(url: &str, dest: &Path) -> Result<PathBuf, AdapterLoadError> {
    if dest.exists() {
        return Ok(dest.to_path_buf());
    }
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| to_load_err("creating cache dir", e))?;
    }
    let response = reqwest::blocking::get(url).map_err(|e| to_load_err("fetching", e))?;
    if !response.status().is_success() {
        return Err(AdapterLoadError(format!("fetching {url}: HTTP {}", response.status())));
    }
    let bytes = response.bytes().map_err(|e| to_load_err("reading response body", e))?;
    let text = if url.ends_with(".bz2") {
        let mut decoder = BzDecoder::new(&bytes[..]);
        let mut out = String::new();
        decoder.read_to_string(&mut out).map_err(|e| to_load_err("decompressing", e))?;
        out
    } else {
        String::from_utf8_lossy(&bytes).into_owned()
    };
    fs::write(dest, &text).map_err(|e| to_load_err("writing cache file", e))?;
    Ok(dest.to_path_buf())
}

/// Fetch (or reuse a cached copy of) the `as-rel2` file published
/// `days_ago` days before today, following the same dated-filename
/// convention as `CAIDAASGraphCollector::get_download_url`.
pub fn fetch_as_rel2(cache_dir: &Path, days_ago: i64) -> Result<PathBuf, AdapterLoadError> {
    let date = Utc::now() - Duration::days(days_ago);
    let stamp = date.format("%Y%m%d").to_string();
    let remote_name = format!("{stamp}.as-rel2.txt.bz2");
    let dest = cache_dir.join(format!("as-rel2-{stamp}.txt"));
    let url = format!("{AS_REL2_INDEX_URL}{remote_name}");
    fetch_cached(&url, &dest)
}

/// Fetch (or reuse a cached copy of) the newest AS2Org table linked from
/// the CAIDA as-organizations index page.
pub fn fetch_as2org_latest(cache_dir: &Path) -> Result<PathBuf, AdapterLoadError> {
    let index = reqwest::blocking::get(AS2ORG_INDEX_URL)
        .map_err(|e| to_load_err("fetching as2org index", e))?
        .text()
        .map_err(|e| to_load_err("reading as2org index", e))?;

    let document = Html::parse_document(&index);
    let selector = Selector::parse("a").map_err(|e| AdapterLoadError(format!("parsing index html: {e:?}")))?;
    let newest = document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .filter(|href| href.ends_with(".txt.bz2") || href.ends_with(".txt"))
        .max()
        .ok_or_else(|| AdapterLoadError("no as2org table link found in index page".to_string()))?
        .to_string();

    let dest = cache_dir.join(newest.rsplit('/').next().unwrap_or(&newest));
    let url = if newest.starts_with("http") {
        newest.clone()
    } else {
        format!("{AS2ORG_INDEX_URL}{newest}")
    };
    fetch_cached(&url, &dest)
}
