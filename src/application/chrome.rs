use crate::presentation::views::{
    BrandView, FlashMessage, FooterView, LayoutChrome, SocialLinkView,
};

/// Static site identity shown on every page.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub title: String,
    pub tagline: String,
    pub about: String,
    pub author: String,
    pub github_url: Option<String>,
    pub twitter_url: Option<String>,
    pub facebook_url: Option<String>,
}

#[derive(Clone)]
pub struct ChromeService {
    site: SiteProfile,
}

impl ChromeService {
    pub fn new(site: SiteProfile) -> Self {
        Self { site }
    }

    pub fn site(&self) -> &SiteProfile {
        &self.site
    }

    pub fn load(&self, flashes: Vec<FlashMessage>, is_admin: bool) -> LayoutChrome {
        let social = [
            ("GitHub", self.site.github_url.as_deref()),
            ("Twitter", self.site.twitter_url.as_deref()),
            ("Facebook", self.site.facebook_url.as_deref()),
        ]
        .into_iter()
        .filter_map(|(label, href)| {
            href.filter(|value| !value.trim().is_empty())
                .map(|href| SocialLinkView {
                    label: label.to_string(),
                    href: href.to_string(),
                })
        })
        .collect();

        LayoutChrome {
            brand: BrandView {
                title: self.site.title.clone(),
                tagline: self.site.tagline.clone(),
                href: "/".to_string(),
            },
            social,
            footer: FooterView {
                copy: format!("Copyright © {}", self.site.author),
            },
            flashes,
            is_admin,
        }
    }
}
