/* src/footer.rs */

use serde::Serialize;

const EU_BASE_URL: &str = "https://eu.deriv.com";
const BASE_URL: &str = "https://deriv.com";
const ASSET_BASE: &str = "https://blog.deriv.com/wp-content/uploads/2023/04";

/// Region a content variant is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Eu,
    NonEu,
}

impl Region {
    pub fn from_flag(is_eu: bool) -> Self {
        if is_eu { Region::Eu } else { Region::NonEu }
    }

    pub fn is_eu(self) -> bool {
        self == Region::Eu
    }
}

/// Which regions a table row is shown to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Availability {
    All,
    NonEuOnly,
}

impl Availability {
    fn admits(self, region: Region) -> bool {
        match self {
            Availability::All => true,
            Availability::NonEuOnly => !region.is_eu(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Target {
    /// Path under the variant's base URL.
    Site(&'static str),
    External(&'static str),
}

struct LinkRow {
    label: &'static str,
    target: Target,
    availability: Availability,
}

struct ColumnRow {
    heading: &'static str,
    links: &'static [LinkRow],
}

const fn link(label: &'static str, path: &'static str) -> LinkRow {
    LinkRow {
        label,
        target: Target::Site(path),
        availability: Availability::All,
    }
}

const fn external(label: &'static str, url: &'static str) -> LinkRow {
    LinkRow {
        label,
        target: Target::External(url),
        availability: Availability::All,
    }
}

const fn non_eu(row: LinkRow) -> LinkRow {
    LinkRow {
        availability: Availability::NonEuOnly,
        ..row
    }
}

const COLUMNS: &[ColumnRow] = &[
    ColumnRow {
        heading: "ABOUT US",
        links: &[
            link("Who we are", "/who-we-are/"),
            link("Why choose us", "/why-choose-us/"),
            link("Principles", "/our-principles/"),
            link("Partnership programmes", "/partners/"),
            link("Contact us", "/contact_us/"),
            link("Careers", "/careers/"),
            external("Deriv life", "https://derivlife.com/"),
        ],
    },
    ColumnRow {
        heading: "TRADE TYPES",
        links: &[
            link("CFDs", "/trade-types/cfds/"),
            non_eu(link("Options", "/trade-types/options/")),
            link("Multipliers", "/trade-types/multiplier/"),
        ],
    },
    ColumnRow {
        heading: "MARKETS",
        links: &[
            link("Forex", "/markets/forex/"),
            link("Derived", "/markets/synthetic/"),
            link("Stocks & indices", "/markets/stock/"),
            link("ETF", "/markets/exchange-traded-funds/"),
            link("Cryptocurrencies", "/markets/cryptocurrencies/"),
            link("Commodities", "/markets/commodities/"),
        ],
    },
    ColumnRow {
        heading: "PLATFORMS",
        links: &[
            link("Deriv MT5", "/dmt5/"),
            non_eu(link("Deriv X", "/derivx/")),
            non_eu(link("Deriv GO", "/deriv-go/")),
            link("Deriv Trader", "/dtrader/"),
            non_eu(external("SmartTrader", "https://smarttrader.deriv.com/")),
            non_eu(link("Deriv Bot", "/dbot/")),
            non_eu(external("Binary Bot", "https://bot.deriv.com/")),
            non_eu(link("Deriv cTrader", "/deriv-ctrader/")),
        ],
    },
    ColumnRow {
        heading: "LEGAL",
        links: &[
            link("Regulatory information", "/regulatory/"),
            link("Terms & conditions", "/terms-and-conditions/#clients"),
            link("Secure & responsible trading", "/responsible/"),
        ],
    },
    ColumnRow {
        heading: "PARTNER",
        links: &[
            link("Affiliates and IBs", "/partners/affiliate-ib/"),
            non_eu(link("Payment agents", "/partners/payment-agent/")),
            external("API", "https://api.deriv.com/"),
            external("Bug bounty", "https://hackerone.com/deriv?type=team"),
        ],
    },
    ColumnRow {
        heading: "SUPPORT",
        links: &[
            link("Help centre", "/help-centre/"),
            external("Community", "https://community.deriv.com/"),
            link("Payment methods", "/payment-methods/"),
            external("Status page", "https://deriv.statuspage.io/"),
            external("Deriv Blog", "https://blog.deriv.com/"),
        ],
    },
];

/// Social networks in display order: name, EU URL, non-EU URL.
const SOCIAL: &[(&str, &str, &str)] = &[
    (
        "facebook",
        "https://www.facebook.com/derivEU",
        "https://www.facebook.com/derivdotcom",
    ),
    (
        "instagram",
        "https://www.instagram.com/deriv_eu/",
        "https://www.instagram.com/deriv_official/",
    ),
    (
        "twitter",
        "https://www.twitter.com/deriv_eu/",
        "https://twitter.com/derivdotcom/",
    ),
    (
        "youtube",
        "https://www.youtube.com/@deriv",
        "https://www.youtube.com/@deriv",
    ),
    (
        "linkedin",
        "https://www.linkedin.com/company/derivdotcom/",
        "https://www.linkedin.com/company/derivdotcom/",
    ),
];

struct SpanRow {
    text: &'static str,
    target: Option<Target>,
    new_tab: bool,
}

struct LicenseRow {
    spans: &'static [SpanRow],
    availability: Availability,
}

const fn plain(text: &'static str) -> SpanRow {
    SpanRow {
        text,
        target: None,
        new_tab: false,
    }
}

const fn anchor(text: &'static str, target: Target) -> SpanRow {
    SpanRow {
        text,
        target: Some(target),
        new_tab: false,
    }
}

const fn blank(text: &'static str, url: &'static str) -> SpanRow {
    SpanRow {
        text,
        target: Some(Target::External(url)),
        new_tab: true,
    }
}

const LICENSES: &[LicenseRow] = &[
    LicenseRow {
        spans: &[
            plain("Deriv Investments "),
            anchor(
                "(Europe)",
                Target::Site("/regulatory/Deriv_Investments_(Europe)_Limited.pdf"),
            ),
            plain(" Limited is licensed and regulated by the Malta Financial Services Authority, Triq L-Imdina, Zone 1, Central Business District, Birkirkara CBD 1010, Malta, under the Investment Services Act (licence). The registered office of Deriv Investments (Europe) Limited is at W Business Centre, Level 3, Triq Dun Karm, Birkirkara BKR9033, Malta."),
        ],
        availability: Availability::All,
    },
    LicenseRow {
        spans: &[
            plain("Deriv (FX) Ltd is licensed by the Labuan Financial Services Authority "),
            anchor("(licence)", Target::Site("/regulatory/Deriv_(FX)_Ltd.pdf")),
            plain(". Deriv (BVI) Ltd is licensed by the British Virgin Islands Financial Services Commission "),
            anchor("(licence)", Target::Site("/regulatory/Deriv_(BVI)_Ltd.pdf")),
            plain(". Deriv (V) Ltd is licensed and regulated by the Vanuatu Financial Services Commission "),
            anchor("(licence)", Target::Site("/regulatory/Deriv_(V)_Ltd.pdf")),
            plain(". Deriv (SVG) LLC has a registered office at First Floor, SVG Teachers Credit Union Uptown Building, Corner of James and Middle Street, Kingstown P.O., St Vincent and the Grenadines."),
        ],
        availability: Availability::All,
    },
    LicenseRow {
        spans: &[plain(
            "Deriv.com Limited is the holding company for the above subsidiaries with the registration number 71479 and the registered address of 2nd Floor, 1 Cornet Street, St Peter Port, Guernsey, GY1 1BZ.",
        )],
        availability: Availability::All,
    },
    LicenseRow {
        spans: &[
            plain("For complete regulatory information, click "),
            anchor("here", Target::External("https://deriv.com/regulatory/")),
            plain("."),
        ],
        availability: Availability::All,
    },
    LicenseRow {
        spans: &[plain(
            "This website's services are not available in certain countries, including the USA, Canada, and Hong Kong, or to persons below 18.",
        )],
        availability: Availability::All,
    },
    LicenseRow {
        spans: &[plain(
            "The information contained in the Blog is for educational purposes only.",
        )],
        availability: Availability::All,
    },
    // Shown alongside the 70.1% disclaimer.
    LicenseRow {
        spans: &[
            plain("Please read our "),
            blank(
                "Terms and conditions",
                "https://deriv.com/terms-and-conditions/#clients",
            ),
            plain(", "),
            blank("Risk disclosure", "https://deriv.com/tnc/risk-disclosure.pdf"),
            plain(", and "),
            blank("Secure and responsible trading", "https://deriv.com/responsible/"),
            plain(" to fully understand the risks involved before using our services. The information on this website does not constitute investment advice."),
        ],
        availability: Availability::NonEuOnly,
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SocialLink {
    pub network: &'static str,
    pub href: &'static str,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FooterLink {
    pub label: &'static str,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FooterColumn {
    pub heading: &'static str,
    pub links: Vec<FooterLink>,
}

/// Run of license text, optionally linked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextSpan {
    pub text: &'static str,
    pub href: Option<String>,
    pub new_tab: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseParagraph {
    pub spans: Vec<TextSpan>,
}

impl LicenseParagraph {
    /// Paragraph text without markup.
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text).collect()
    }

    pub fn hrefs(&self) -> impl Iterator<Item = &str> {
        self.spans.iter().filter_map(|span| span.href.as_deref())
    }
}

/// CFD risk warning shown under the footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Disclaimer {
    /// Share of retail accounts losing money, e.g. `"73%"`.
    pub loss_percentage: &'static str,
}

impl Disclaimer {
    /// Text before the headline.
    pub const LEAD: &'static str = "CFDs and other products offered on this website are complex instruments with high risk of losing money rapidly owing to leverage.";

    /// Text after the headline.
    pub const TAIL: &'static str = "You should consider whether you understand how these products work and whether you can afford to risk losing your money.";

    /// Sentence that is emphasised inside the disclaimer.
    pub fn headline(&self) -> String {
        format!(
            "{} of retail investor accounts lose money when trading CFDs with Deriv.",
            self.loss_percentage
        )
    }

    pub fn text(&self) -> String {
        format!("{} {} {}", Self::LEAD, self.headline(), Self::TAIL)
    }
}

/// Footer content for one region, fully resolved from the static table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentVariant {
    pub region: Region,
    pub base_url: &'static str,
    pub logo: String,
    pub social: Vec<SocialLink>,
    pub columns: Vec<FooterColumn>,
    pub licenses: Vec<LicenseParagraph>,
    pub disclaimer: Disclaimer,
}

impl ContentVariant {
    pub fn name(&self) -> &'static str {
        match self.region {
            Region::Eu => "eu",
            Region::NonEu => "non-eu",
        }
    }

    /// Every link href in column order.
    pub fn hrefs(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .flat_map(|c| c.links.iter().map(|l| l.href.as_str()))
    }

    pub fn has_link(&self, label: &str) -> bool {
        self.columns
            .iter()
            .any(|c| c.links.iter().any(|l| l.label == label))
    }
}

fn resolve(target: Target, base_url: &str) -> String {
    match target {
        Target::Site(path) => format!("{base_url}{path}"),
        Target::External(url) => url.to_string(),
    }
}

/// Select the footer content for a visitor. Pure and deterministic.
pub fn select_footer_variant(is_eu: bool) -> ContentVariant {
    let region = Region::from_flag(is_eu);
    let base_url = if is_eu { EU_BASE_URL } else { BASE_URL };

    let social = SOCIAL
        .iter()
        .map(|&(network, eu, non_eu)| SocialLink {
            network,
            href: if is_eu { eu } else { non_eu },
            icon: format!("{ASSET_BASE}/{network}.svg"),
        })
        .collect();

    let columns = COLUMNS
        .iter()
        .map(|column| FooterColumn {
            heading: column.heading,
            links: column
                .links
                .iter()
                .filter(|row| row.availability.admits(region))
                .map(|row| FooterLink {
                    label: row.label,
                    href: resolve(row.target, base_url),
                })
                .collect(),
        })
        .collect();

    let licenses = LICENSES
        .iter()
        .filter(|row| row.availability.admits(region))
        .map(|row| LicenseParagraph {
            spans: row
                .spans
                .iter()
                .map(|span| TextSpan {
                    text: span.text,
                    href: span.target.map(|target| resolve(target, base_url)),
                    new_tab: span.new_tab,
                })
                .collect(),
        })
        .collect();

    ContentVariant {
        region,
        base_url,
        logo: format!("{ASSET_BASE}/deriv-new-logo.svg"),
        social,
        columns,
        licenses,
        disclaimer: Disclaimer {
            loss_percentage: if is_eu { "73%" } else { "70.1%" },
        },
    }
}
