//! Known services whose feed URLs can be derived from the page URL alone.

use url::Url;

use super::FeedCandidate;

type ServiceMatcher = fn(&Url) -> Option<Vec<FeedCandidate>>;

const MATCHERS: &[ServiceMatcher] = &[github, reddit];

/// Returns feeds for a recognized service, or `None` to fall through to
/// page scanning.
pub(super) fn match_service(url: &Url) -> Option<Vec<FeedCandidate>> {
    MATCHERS
        .iter()
        .filter_map(|matcher| matcher(url))
        .find(|feeds| !feeds.is_empty())
}

fn host_is(url: &Url, domain: &str) -> bool {
    url.host_str().is_some_and(|host| {
        let host = host.to_ascii_lowercase();
        host == domain || host.ends_with(&format!(".{domain}"))
    })
}

/// Non-empty path segments, at most `n` of them.
fn segments(url: &Url, n: usize) -> Vec<&str> {
    url.path_segments()
        .map(|segs| segs.filter(|s| !s.is_empty()).take(n).collect())
        .unwrap_or_default()
}

fn github(url: &Url) -> Option<Vec<FeedCandidate>> {
    if !host_is(url, "github.com") {
        return None;
    }

    let mut feeds = vec![
        FeedCandidate::new("global public timeline", "https://github.com/timeline"),
        FeedCandidate::new(
            "global security advisories",
            "https://github.com/security-advisories.atom",
        ),
    ];

    let segs = segments(url, 2);
    let Some(user) = segs.first().copied() else {
        return Some(feeds);
    };
    if !is_github_user(user) {
        return Some(feeds);
    }
    feeds.push(FeedCandidate::new(
        format!("{user} public timeline"),
        format!("https://github.com/{user}.atom"),
    ));

    if let Some(repo) = segs.get(1).copied().filter(|r| is_github_repo(r)) {
        let user_repo = format!("{user}/{repo}");
        for kind in ["commits", "releases", "tags", "wiki"] {
            feeds.push(FeedCandidate::new(
                format!("{user_repo} {kind}"),
                format!("https://github.com/{user_repo}/{kind}.atom"),
            ));
        }
    }

    Some(feeds)
}

/// Alphanumerics and single hyphens, 1 to 39 characters.
fn is_github_user(name: &str) -> bool {
    (1..=39).contains(&name.len())
        && !name.starts_with('-')
        && !name.ends_with('-')
        && !name.contains("--")
        && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

fn is_github_repo(name: &str) -> bool {
    (1..=100).contains(&name.len())
        && name != "."
        && name != ".."
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

fn reddit(url: &Url) -> Option<Vec<FeedCandidate>> {
    if !host_is(url, "reddit.com") {
        return None;
    }

    let segs = segments(url, 3);
    let feeds = match segs.as_slice() {
        [] => vec![FeedCandidate::new("global", "https://www.reddit.com/.rss")],
        ["r", _, "comments", ..] => {
            let mut post = url.clone();
            post.set_query(None);
            post.set_fragment(None);
            let link = format!("{}.rss", post.as_str().trim_end_matches('/'));
            vec![FeedCandidate::new("post", link)]
        }
        ["r", sub, ..] => ["hot", "new", "top", "rising"]
            .iter()
            .map(|sort| {
                FeedCandidate::new(
                    format!("/r/{sub} {sort}"),
                    format!("https://reddit.com/r/{sub}/{sort}/.rss"),
                )
            })
            .collect(),
        ["user" | "u", name, ..] => reddit_user_feeds(name),
        ["domain", domain, ..] => vec![FeedCandidate::new(
            format!("/domain/{domain}"),
            format!("https://reddit.com/domain/{domain}/.rss"),
        )],
        _ => return None,
    };
    Some(feeds)
}

fn reddit_user_feeds(name: &str) -> Vec<FeedCandidate> {
    let mut feeds = Vec::with_capacity(10);
    for (label, path) in [
        ("overview", ""),
        ("post", "submitted/"),
        ("comments", "comments/"),
    ] {
        for sort in ["new", "hot", "top"] {
            feeds.push(FeedCandidate::new(
                format!("/u/{name} {label} {sort}"),
                format!("https://reddit.com/user/{name}/{path}.rss?sort={sort}"),
            ));
        }
    }
    feeds.push(FeedCandidate::new(
        format!("/u/{name} awards received (legacy)"),
        format!("https://old.reddit.com/user/{name}/gilded/.rss"),
    ));
    feeds
}
