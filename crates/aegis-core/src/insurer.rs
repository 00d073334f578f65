//! Insurer detection and provider-finder directory
//!
//! Maps major US health insurers to their online provider finder URLs and
//! detects which insurer a user has by scanning their uploaded document
//! text for known keywords.

use serde::Serialize;

/// One insurer's directory entry
#[derive(Debug, Clone, Serialize)]
pub struct InsurerDirectory {
    /// Stable identifier
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    /// Keywords matched against document text to detect this insurer
    #[serde(skip)]
    pub keywords: &'static [&'static str],
    /// The insurer's provider search URL
    pub finder_url: &'static str,
}

/// Minimum keyword hits before a detection counts; a single mention of an
/// insurer name is too easy to produce in passing (e.g. a comparison table
/// inside an unrelated plan document).
const MIN_KEYWORD_HITS: usize = 2;

static DIRECTORIES: &[InsurerDirectory] = &[
    InsurerDirectory {
        id: "aetna",
        name: "Aetna",
        keywords: &["aetna", "aetna life", "aetna health"],
        finder_url: "https://www.aetna.com/dsepublicContent1/assets/pages/defined/findDoctor.html",
    },
    InsurerDirectory {
        id: "anthem",
        name: "Anthem / Elevance",
        keywords: &["anthem", "elevance", "anthem blue cross"],
        finder_url: "https://www.anthem.com/find-care/",
    },
    InsurerDirectory {
        id: "bcbs",
        name: "Blue Cross Blue Shield",
        keywords: &["blue cross", "blue shield", "bcbs", "bluecross", "blueshield"],
        finder_url: "https://www.bcbs.com/find-a-doctor",
    },
    InsurerDirectory {
        id: "cigna",
        name: "Cigna",
        keywords: &["cigna", "cigna health"],
        finder_url: "https://hcpdirectory.cigna.com/web/public/consumer/directory",
    },
    InsurerDirectory {
        id: "humana",
        name: "Humana",
        keywords: &["humana"],
        finder_url: "https://www.humana.com/finder/medical",
    },
    InsurerDirectory {
        id: "kaiser",
        name: "Kaiser Permanente",
        keywords: &["kaiser", "kaiser permanente"],
        finder_url: "https://healthy.kaiserpermanente.org/health/care/!ut/p/a0/doctor-finder",
    },
    InsurerDirectory {
        id: "molina",
        name: "Molina Healthcare",
        keywords: &["molina"],
        finder_url: "https://www.molinahealthcare.com/members/common/en-us/fad/provdir.aspx",
    },
    InsurerDirectory {
        id: "oscar",
        name: "Oscar Health",
        keywords: &["oscar", "oscar health"],
        finder_url: "https://www.hioscar.com/search",
    },
    InsurerDirectory {
        id: "united",
        name: "UnitedHealthcare",
        keywords: &["unitedhealthcare", "united healthcare", "uhc", "united health"],
        finder_url: "https://www.uhc.com/find-a-doctor",
    },
    InsurerDirectory {
        id: "centene",
        name: "Centene / Ambetter",
        keywords: &["centene", "ambetter"],
        finder_url: "https://ambetter.findyourplan.com/",
    },
    InsurerDirectory {
        id: "medicare",
        name: "Medicare",
        keywords: &["medicare", "cms"],
        finder_url: "https://www.medicare.gov/care-compare/",
    },
    InsurerDirectory {
        id: "medicaid",
        name: "Medicaid",
        keywords: &["medicaid"],
        finder_url: "https://www.healthcare.gov/medicaid-chip/",
    },
];

/// All known insurer directory entries
#[must_use]
pub fn insurer_directories() -> &'static [InsurerDirectory] {
    DIRECTORIES
}

/// Detect the user's insurer by scanning document text for known
/// keywords. Scores each insurer by total keyword occurrences across all
/// texts and returns the best match, or `None` below the hit threshold.
#[must_use]
pub fn detect_insurer<S: AsRef<str>>(document_texts: &[S]) -> Option<&'static InsurerDirectory> {
    let combined = document_texts
        .iter()
        .map(|t| t.as_ref().to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");

    let mut best: Option<&'static InsurerDirectory> = None;
    let mut best_score = 0usize;

    for insurer in DIRECTORIES {
        let score: usize = insurer
            .keywords
            .iter()
            .map(|keyword| combined.matches(keyword).count())
            .sum();
        if score > best_score {
            best_score = score;
            best = Some(insurer);
        }
    }

    if best_score >= MIN_KEYWORD_HITS {
        best
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_insurer_from_repeated_mentions() {
        let texts = [
            "Aetna Open Access plan. Summary of Benefits and Coverage.",
            "Questions? Call Aetna member services at the number on your card.",
        ];
        let insurer = detect_insurer(&texts).expect("should detect");
        assert_eq!(insurer.id, "aetna");
    }

    #[test]
    fn test_single_mention_is_not_enough() {
        let texts = ["This plan is administered by Humana."];
        assert!(detect_insurer(&texts).is_none());
    }

    #[test]
    fn test_no_documents() {
        let texts: [&str; 0] = [];
        assert!(detect_insurer(&texts).is_none());
    }

    #[test]
    fn test_best_scoring_insurer_wins() {
        let texts = [
            "Cigna dental plan overview. Cigna pays 80% after deductible. \
             For comparison, some Aetna plans differ.",
        ];
        let insurer = detect_insurer(&texts).expect("should detect");
        assert_eq!(insurer.id, "cigna");
    }

    #[test]
    fn test_multi_word_keywords_match() {
        let texts = [
            "Blue Cross and Blue Shield of Texas. BlueCross network tiers apply.",
        ];
        let insurer = detect_insurer(&texts).expect("should detect");
        assert_eq!(insurer.id, "bcbs");
    }

    #[test]
    fn test_directory_entries_have_finder_urls() {
        for insurer in insurer_directories() {
            assert!(insurer.finder_url.starts_with("https://"));
            assert!(!insurer.keywords.is_empty());
        }
    }
}
