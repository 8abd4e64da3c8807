// Copy-restriction policy - decides whether a post may be forwarded natively.
//
// A restricted post must be re-uploaded instead of forwarded so the source
// channel's no-repost wishes are respected. The check is a deliberately
// simple lowercase substring match; nothing locale-aware.

/// Pluggable predicate over a post's text and hashtag/cashtag entities.
#[derive(Debug, Clone)]
pub struct RestrictionPolicy {
    keywords: Vec<&'static str>,
    tag_denylist: Vec<&'static str>,
}

/// Keywords that signal the author forbids reposting. Mixed languages on
/// purpose - the watched channels are too.
const RESTRICTION_KEYWORDS: &[&str] = &[
    "не копировать",
    "copyright",
    "all rights reserved",
    "©",
    "watermark",
    "водяной знак",
    "запрещено копирование",
    "копирование запрещено",
    "do not copy",
    "no repost",
    "не репостить",
    "без репоста",
];

const TAG_DENYLIST: &[&str] = &["#nocopy", "#неrepost", "#запретпоста"];

impl Default for RestrictionPolicy {
    fn default() -> Self {
        Self {
            keywords: RESTRICTION_KEYWORDS.to_vec(),
            tag_denylist: TAG_DENYLIST.to_vec(),
        }
    }
}

impl RestrictionPolicy {
    /// True if the item's text/caption contains a restriction keyword or
    /// one of its hashtag/cashtag entities matches the denylist.
    pub fn is_restricted(&self, text: Option<&str>, tags: &[String]) -> bool {
        if let Some(text) = text {
            let lowered = text.to_lowercase();
            for keyword in &self.keywords {
                if lowered.contains(keyword) {
                    tracing::warn!(keyword = %keyword, "copying restricted by keyword");
                    return true;
                }
            }
        }

        for tag in tags {
            let tag = tag.to_lowercase();
            if self.tag_denylist.iter().any(|deny| tag.contains(deny)) {
                tracing::warn!(tag = %tag, "copying restricted by hashtag");
                return true;
            }
        }

        false
    }
}
