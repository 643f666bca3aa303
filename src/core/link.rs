//! Share link classification.
//!
//! MEGA exposes three public link shapes: folder shares, file shares, and a
//! legacy file format with id and key packed into the fragment. The id
//! identifies the remote node; the key after the fragment separator is the
//! decryption credential and is never logged. The key is not validated here:
//! a bad key surfaces later as a backend metadata or decryption failure.

use regex::Regex;
use std::sync::LazyLock;

// Old-format link: https://mega.nz/#!<id>!<key>
static LEGACY_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://mega\.(?:co\.nz|nz)/#!([\w-]+)!([\w-]+)$").unwrap());

/// A parsed share link. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareLink {
    File { id: String, key: String },
    Folder { id: String, key: String },
}

/// Classify a raw URL into a [`ShareLink`].
///
/// Returns `None` for anything that matches none of the accepted shapes,
/// including malformed inputs missing the fragment separator. Classification
/// failure is a normal outcome, never a panic.
pub fn parse_share_link(url: &str) -> Option<ShareLink> {
    if url.contains("mega.nz/folder/") {
        let (id, key) = split_public_link(url, "folder/")?;
        return Some(ShareLink::Folder { id, key });
    }

    if url.contains("mega.nz/file/") {
        let (id, key) = split_public_link(url, "file/")?;
        return Some(ShareLink::File { id, key });
    }

    let caps = LEGACY_LINK.captures(url)?;
    Some(ShareLink::File {
        id: caps[1].to_string(),
        key: caps[2].to_string(),
    })
}

/// id is the segment between `marker` and the fragment separator; key is the
/// fragment up to any further separator.
fn split_public_link(url: &str, marker: &str) -> Option<(String, String)> {
    let after = url.splitn(2, marker).nth(1)?;
    let (id, rest) = after.split_once('#')?;
    let key = match rest.split_once('#') {
        Some((key, _)) => key,
        None => rest,
    };
    Some((id.to_string(), key.to_string()))
}
