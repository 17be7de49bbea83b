//! Text candidate extraction from decoded chunks
//!
//! A fixed set of pattern matchers runs over each decoded block and pulls
//! out candidate substrings per category. The patterns are deliberately
//! loose: this is byte-soup matching, and the sanity filtering happens
//! later when pools are built.

use super::decode::{decode_latin1, decode_utf8_lossy};
use crate::config::ScanConfig;
use regex_lite::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

static RE_DATE: OnceLock<Regex> = OnceLock::new();
static RE_AMOUNT: OnceLock<Regex> = OnceLock::new();
static RE_CODE: OnceLock<Regex> = OnceLock::new();
static RE_NAME: OnceLock<Regex> = OnceLock::new();
static RE_EMAIL: OnceLock<Regex> = OnceLock::new();
static RE_PHONE: OnceLock<Regex> = OnceLock::new();
static RE_PRODUCT: OnceLock<Regex> = OnceLock::new();

fn re_date() -> &'static Regex {
    RE_DATE.get_or_init(|| {
        Regex::new(r"\d{4}[-/]\d{1,2}[-/]\d{1,2}|\d{1,2}[-/]\d{1,2}[-/]\d{4}").unwrap()
    })
}

fn re_amount() -> &'static Regex {
    RE_AMOUNT.get_or_init(|| Regex::new(r"\$?\d{1,3}(?:,\d{3})*(?:\.\d{2})?|\d+\.\d{2}").unwrap())
}

fn re_code() -> &'static Regex {
    RE_CODE.get_or_init(|| Regex::new(r"[A-Z]{1,3}\d{3,8}").unwrap())
}

fn re_name() -> &'static Regex {
    RE_NAME.get_or_init(|| Regex::new(r"[A-Z][A-Za-z\s&\.]{10,80}").unwrap())
}

fn re_email() -> &'static Regex {
    RE_EMAIL.get_or_init(|| {
        Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap()
    })
}

fn re_phone() -> &'static Regex {
    RE_PHONE.get_or_init(|| Regex::new(r"\d{3}[-\s]?\d{3}[-\s]?\d{4}").unwrap())
}

fn re_product() -> &'static Regex {
    RE_PRODUCT.get_or_init(|| {
        Regex::new(
            r"(?:MAIZ|SORGO|SOYA|TRIGO|AVENA|CEBADA|ALIMENTO|MELAZA|SALVADO|PASTA|HARINA)[A-Z \t]{0,50}",
        )
        .unwrap()
    })
}

/// One list of candidate substrings per category
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    pub dates: Vec<String>,
    pub amounts: Vec<String>,
    pub codes: Vec<String>,
    pub names: Vec<String>,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
    pub products: Vec<String>,
}

impl CandidateSet {
    /// Total candidates across all categories
    pub fn len(&self) -> usize {
        self.dates.len()
            + self.amounts.len()
            + self.codes.len()
            + self.names.len()
            + self.emails.len()
            + self.phones.len()
            + self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fold another set into this one
    pub fn merge(&mut self, other: CandidateSet) {
        self.dates.extend(other.dates);
        self.amounts.extend(other.amounts);
        self.codes.extend(other.codes);
        self.names.extend(other.names);
        self.emails.extend(other.emails);
        self.phones.extend(other.phones);
        self.products.extend(other.products);
    }

    /// Drop duplicate candidates within each category, preserving first-seen
    /// order. Run once after all chunks are merged.
    pub fn dedup(&mut self) {
        fn dedup_vec(v: &mut Vec<String>) {
            let mut seen = HashSet::with_capacity(v.len());
            v.retain(|s| seen.insert(s.clone()));
        }
        dedup_vec(&mut self.dates);
        dedup_vec(&mut self.amounts);
        dedup_vec(&mut self.codes);
        dedup_vec(&mut self.names);
        dedup_vec(&mut self.emails);
        dedup_vec(&mut self.phones);
        dedup_vec(&mut self.products);
    }
}

/// Per-chunk caps on candidates, copied out of `ScanConfig`
#[derive(Debug, Clone, Copy)]
struct Limits {
    dates: usize,
    amounts: usize,
    names: usize,
    products: usize,
    codes: usize,
    emails: usize,
    phones: usize,
}

/// Stateless extractor applying the category matchers to a byte block
#[derive(Debug, Clone)]
pub struct CandidateExtractor {
    limits: Limits,
}

impl CandidateExtractor {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            limits: Limits {
                dates: config.max_dates_per_chunk,
                amounts: config.max_amounts_per_chunk,
                names: config.max_names_per_chunk,
                products: config.max_products_per_chunk,
                codes: config.max_codes_per_chunk,
                emails: config.max_emails_per_chunk,
                phones: config.max_phones_per_chunk,
            },
        }
    }

    /// Extract candidates from one raw block, decoding under both
    /// encodings. Pure: no shared state is touched.
    pub fn extract_block(&self, bytes: &[u8]) -> CandidateSet {
        let mut set = CandidateSet::default();
        self.extract_text(&decode_utf8_lossy(bytes), &mut set);
        self.extract_text(&decode_latin1(bytes), &mut set);
        set
    }

    /// Run all category matchers over decoded text
    pub fn extract_text(&self, text: &str, out: &mut CandidateSet) {
        collect(re_date(), text, self.limits.dates, &mut out.dates);
        collect(re_amount(), text, self.limits.amounts, &mut out.amounts);
        collect(re_code(), text, self.limits.codes, &mut out.codes);
        collect(re_name(), text, self.limits.names, &mut out.names);
        collect(re_email(), text, self.limits.emails, &mut out.emails);
        collect(re_phone(), text, self.limits.phones, &mut out.phones);
        collect(re_product(), text, self.limits.products, &mut out.products);
    }
}

fn collect(re: &Regex, text: &str, cap: usize, out: &mut Vec<String>) {
    for m in re.find_iter(text).take(cap) {
        out.push(m.as_str().trim().to_string());
    }
}
