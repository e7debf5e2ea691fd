//! Email address canonicalization with provider-specific rules.
//!
//! Domains are always lowercased. Local parts lose sub-addresses for the
//! providers that ignore them (`+tag` for Gmail, iCloud and Outlook, `-tag` for
//! Yahoo), Gmail local parts also lose single dots, and `googlemail.com` folds
//! into `gmail.com`. Everything else keeps its local part apart from case.

const GMAIL_DOMAINS: &[&str] = &["gmail.com", "googlemail.com"];

const ICLOUD_DOMAINS: &[&str] = &["icloud.com", "me.com"];

const OUTLOOK_DOMAINS: &[&str] = &[
    "hotmail.at", "hotmail.be", "hotmail.ca", "hotmail.cl", "hotmail.co.il", "hotmail.co.nz",
    "hotmail.co.th", "hotmail.co.uk", "hotmail.com", "hotmail.com.ar", "hotmail.com.au",
    "hotmail.com.br", "hotmail.com.gr", "hotmail.com.mx", "hotmail.com.pe", "hotmail.com.tr",
    "hotmail.com.vn", "hotmail.cz", "hotmail.de", "hotmail.dk", "hotmail.es", "hotmail.fr",
    "hotmail.hu", "hotmail.id", "hotmail.ie", "hotmail.in", "hotmail.it", "hotmail.jp",
    "hotmail.kr", "hotmail.lv", "hotmail.my", "hotmail.ph", "hotmail.pt", "hotmail.sa",
    "hotmail.sg", "hotmail.sk", "live.be", "live.co.uk", "live.com", "live.com.ar",
    "live.com.mx", "live.de", "live.es", "live.eu", "live.fr", "live.it", "live.nl", "msn.com",
    "outlook.at", "outlook.be", "outlook.cl", "outlook.co.il", "outlook.co.nz", "outlook.co.th",
    "outlook.com", "outlook.com.ar", "outlook.com.au", "outlook.com.br", "outlook.com.gr",
    "outlook.com.pe", "outlook.com.tr", "outlook.com.vn", "outlook.cz", "outlook.de",
    "outlook.dk", "outlook.es", "outlook.fr", "outlook.hu", "outlook.id", "outlook.ie",
    "outlook.in", "outlook.it", "outlook.jp", "outlook.kr", "outlook.lv", "outlook.my",
    "outlook.ph", "outlook.pt", "outlook.sa", "outlook.sg", "outlook.sk", "passport.com",
];

const YAHOO_DOMAINS: &[&str] = &[
    "rocketmail.com", "yahoo.ca", "yahoo.co.uk", "yahoo.com", "yahoo.de", "yahoo.fr",
    "yahoo.in", "yahoo.it", "ymail.com",
];

const YANDEX_DOMAINS: &[&str] = &[
    "yandex.ru", "yandex.ua", "yandex.kz", "yandex.com", "yandex.by", "ya.ru",
];

/// Canonicalizes `email`. `all_lowercase` controls the local part of addresses
/// without a provider rule; provider rules always lowercase.
///
/// Returns `None` when a provider rule leaves the local part empty.
pub fn normalize_email(email: &str, all_lowercase: bool) -> Option<String> {
    let (user, domain) = match email.rfind('@') {
        Some(at) => (&email[..at], &email[at + 1..]),
        None => ("", email),
    };
    let mut domain = domain.to_lowercase();
    let mut user = user.to_string();

    if GMAIL_DOMAINS.contains(&domain.as_str()) {
        user = strip_subaddress(&user, '+');
        user = remove_single_dots(&user);
        if user.is_empty() {
            return None;
        }
        user = user.to_lowercase();
        domain = "gmail.com".to_string();
    } else if ICLOUD_DOMAINS.contains(&domain.as_str()) || OUTLOOK_DOMAINS.contains(&domain.as_str()) {
        user = strip_subaddress(&user, '+');
        if user.is_empty() {
            return None;
        }
        user = user.to_lowercase();
    } else if YAHOO_DOMAINS.contains(&domain.as_str()) {
        let components: Vec<&str> = user.split('-').collect();
        user = if components.len() > 1 {
            components[..components.len() - 1].join("-")
        } else {
            components[0].to_string()
        };
        if user.is_empty() {
            return None;
        }
        user = user.to_lowercase();
    } else if YANDEX_DOMAINS.contains(&domain.as_str()) {
        user = user.to_lowercase();
        domain = "yandex.ru".to_string();
    } else if all_lowercase {
        user = user.to_lowercase();
    }

    Some(format!("{}@{}", user, domain))
}

fn strip_subaddress(user: &str, separator: char) -> String {
    user.split(separator).next().unwrap_or_default().to_string()
}

// Single dots are dropped; runs of two or more are kept as they are.
fn remove_single_dots(user: &str) -> String {
    let mut out = String::with_capacity(user.len());
    let mut run = 0usize;
    for c in user.chars().chain(std::iter::once('\0')) {
        if c == '.' {
            run += 1;
            continue;
        }
        if run > 1 {
            out.extend(std::iter::repeat('.').take(run));
        }
        run = 0;
        if c != '\0' {
            out.push(c);
        }
    }
    out
}
