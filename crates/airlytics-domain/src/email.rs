//! Email and display-name normalization, plus typo hints for common mail domains.

/// Email rejected by [`normalize_email`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailError {
    #[error("email is empty")]
    Empty,
    #[error("email is malformed")]
    Malformed,
}

/// Trim, lowercase and syntactically check an email address (`local@domain.tld`).
pub fn normalize_email(raw: &str) -> Result<String, EmailError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(EmailError::Empty);
    }
    let (local, domain) = email.split_once('@').ok_or(EmailError::Malformed)?;
    let well_formed = !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(head, tail)| !head.is_empty() && !tail.is_empty())
        && !domain.ends_with('.');
    if !well_formed {
        return Err(EmailError::Malformed);
    }
    Ok(email)
}

/// Collapse whitespace runs and drop control characters.
pub fn sanitize_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| word.chars().filter(|c| !c.is_control()).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

const COMMON_DOMAINS: [&str; 10] = [
    "gmail.com",
    "yahoo.com",
    "outlook.com",
    "hotmail.com",
    "icloud.com",
    "live.com",
    "rediffmail.com",
    "proton.me",
    "protonmail.com",
    "aol.com",
];

/// Misspellings too far from their domain for the edit-distance match.
const KNOWN_TYPOS: [(&str, &str); 13] = [
    ("gamil.com", "gmail.com"),
    ("gmial.com", "gmail.com"),
    ("gnail.com", "gmail.com"),
    ("gmaill.com", "gmail.com"),
    ("gmal.com", "gmail.com"),
    ("yaho.com", "yahoo.com"),
    ("yahho.com", "yahoo.com"),
    ("hotnail.com", "hotmail.com"),
    ("homail.com", "hotmail.com"),
    ("outllok.com", "outlook.com"),
    ("outook.com", "outlook.com"),
    ("icloud.co", "icloud.com"),
    ("redifmail.com", "rediffmail.com"),
];

const MAX_SUGGESTION_DISTANCE: usize = 2;

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = (above + 1)
                .min(row[j] + 1)
                .min(diagonal + usize::from(ca != *cb));
            diagonal = above;
        }
    }
    row[b.len()]
}

/// Suggest a corrected address when the domain looks like a typo of a common provider.
///
/// Returns `None` for exact matches and for domains not close to any known provider.
pub fn suggest_email_correction(email: &str) -> Option<String> {
    let (local, domain) = email.trim().split_once('@')?;
    let domain = domain.to_lowercase();
    if domain.is_empty() {
        return None;
    }

    if let Some((_, fixed)) = KNOWN_TYPOS.iter().find(|(typo, _)| *typo == domain) {
        return Some(format!("{local}@{fixed}"));
    }

    let (closest, distance) = COMMON_DOMAINS
        .iter()
        .map(|candidate| (*candidate, levenshtein(&domain, candidate)))
        .min_by_key(|(_, distance)| *distance)?;
    (distance > 0 && distance <= MAX_SUGGESTION_DISTANCE).then(|| format!("{local}@{closest}"))
}
