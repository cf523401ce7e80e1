//! Platform detection.
//!
//! A single static table maps URL substrings to a [`Platform`]. Detection and
//! normalizer dispatch both key off that enum, so the two can never disagree.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Instagram,
    TikTok,
    Twitter,
    Douyin,
    SnackVideo,
    MediaFire,
    SoundCloud,
    Threads,
    Xvideos,
    Spotify,
    YouTube,
    Facebook,
}

#[derive(Debug)]
pub struct PlatformRule {
    pub match_domains: &'static [&'static str],
    pub platform: Platform,
    pub endpoint_path: &'static str,
}

/// Registration order matters: the first rule with a matching substring wins.
pub static PLATFORM_RULES: [PlatformRule; 12] = [
    PlatformRule {
        match_domains: &["instagram.com"],
        platform: Platform::Instagram,
        endpoint_path: "instagram",
    },
    PlatformRule {
        match_domains: &["tiktok.com", "vm.tiktok.com"],
        platform: Platform::TikTok,
        endpoint_path: "tiktok",
    },
    PlatformRule {
        match_domains: &["twitter.com", "x.com"],
        platform: Platform::Twitter,
        endpoint_path: "twitter",
    },
    PlatformRule {
        match_domains: &["douyin.com", "v.douyin.com"],
        platform: Platform::Douyin,
        endpoint_path: "dou_douyin",
    },
    PlatformRule {
        match_domains: &["snackvideo.com", "s.snackvideo.com"],
        platform: Platform::SnackVideo,
        endpoint_path: "snackvideo",
    },
    PlatformRule {
        match_domains: &["mediafire.com"],
        platform: Platform::MediaFire,
        endpoint_path: "mediafire",
    },
    PlatformRule {
        match_domains: &["soundcloud.com"],
        platform: Platform::SoundCloud,
        endpoint_path: "soundcloud",
    },
    PlatformRule {
        match_domains: &["threads.net", "threads.com"],
        platform: Platform::Threads,
        endpoint_path: "threads",
    },
    PlatformRule {
        match_domains: &["xvideos.com"],
        platform: Platform::Xvideos,
        endpoint_path: "xvideos",
    },
    PlatformRule {
        match_domains: &["spotify.com"],
        platform: Platform::Spotify,
        endpoint_path: "spotify",
    },
    PlatformRule {
        match_domains: &["youtube.com", "youtu.be"],
        platform: Platform::YouTube,
        endpoint_path: "youtube",
    },
    PlatformRule {
        match_domains: &["facebook.com", "fb.watch", "m.facebook.com"],
        platform: Platform::Facebook,
        endpoint_path: "facebook",
    },
];

impl Platform {
    pub fn name(self) -> &'static str {
        match self {
            Self::Instagram => "Instagram",
            Self::TikTok => "TikTok",
            Self::Twitter => "Twitter",
            Self::Douyin => "Douyin",
            Self::SnackVideo => "SnackVideo",
            Self::MediaFire => "MediaFire",
            Self::SoundCloud => "SoundCloud",
            Self::Threads => "Threads",
            Self::Xvideos => "Xvideos",
            Self::Spotify => "Spotify",
            Self::YouTube => "YouTube",
            Self::Facebook => "Facebook",
        }
    }

    pub fn rule(self) -> &'static PlatformRule {
        // Variants are declared in registration order.
        &PLATFORM_RULES[self as usize]
    }

    pub fn endpoint_path(self) -> &'static str {
        self.rule().endpoint_path
    }
}

/// Matches by substring containment on the lowercased URL, so a domain in a
/// query string or path segment also counts. `None` means unsupported.
pub fn detect_platform(url: &str) -> Option<&'static PlatformRule> {
    let lower = url.to_lowercase();
    PLATFORM_RULES.iter().find(|rule| {
        rule.match_domains
            .iter()
            .any(|domain| lower.contains(domain))
    })
}

pub fn supported_platform_names() -> Vec<&'static str> {
    PLATFORM_RULES
        .iter()
        .map(|rule| rule.platform.name())
        .collect()
}
