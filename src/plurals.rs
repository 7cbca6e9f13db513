//! Plural-form counts for catalog languages.
//!
//! Catalog language codes look like `de`, `pt_BR` or `pt-BR`. The number of
//! translation variants a plural message needs is the number of CLDR cardinal
//! categories reachable by whole numbers in that language.

use icu_locale::Locale;
use icu_plurals::{PluralCategory, PluralRuleType, PluralRules};

use crate::error::{CatalogError, CatalogResult};

/// A plural category used by a language, with a number that selects it.
#[derive(Debug, Clone, PartialEq)]
pub struct PluralForm {
    pub category: PluralCategory,
    pub test_value: u32,
}

/// Splits a catalog language code into language and territory.
///
/// `pt_BR` and the older `pt-BR` spelling both give `("pt", Some("BR"))`.
pub fn language_and_territory(code: &str) -> (&str, Option<&str>) {
    let separator = code.find('_').or_else(|| code.find('-'));
    match separator {
        Some(pos) => (&code[..pos], Some(&code[pos + 1..])),
        None => (code, None),
    }
}

/// Parses a catalog language code into an ICU locale.
pub fn parse_language_code(code: &str) -> CatalogResult<Locale> {
    let (language, territory) = language_and_territory(code);
    let tag = match territory {
        Some(territory) if !territory.is_empty() => format!("{}-{}", language, territory),
        _ => language.to_string(),
    };
    tag.parse()
        .map_err(|e| CatalogError::InvalidLocale(format!("'{}': {}", code, e)))
}

/// All plural forms of a language with representative numbers.
///
/// For example English has one (1) and other (6), Russian has one (1),
/// few (3) and many (5).
pub fn get_plural_forms_for_language(code: &str) -> CatalogResult<Vec<PluralForm>> {
    let locale = parse_language_code(code)?;

    let pr = PluralRules::try_new(locale.into(), PluralRuleType::Cardinal.into()).map_err(|e| {
        CatalogError::PluralRules(format!(
            "Failed to create PluralRules for language '{}': {}",
            code, e
        ))
    })?;

    let test_values_by_category = [
        (PluralCategory::Zero, vec![0u32]),
        (PluralCategory::One, vec![1u32, 21u32, 31u32, 41u32]),
        (PluralCategory::Two, vec![2u32, 22u32, 32u32]),
        (PluralCategory::Few, vec![3u32, 4u32, 23u32, 24u32]),
        (PluralCategory::Many, vec![5u32, 11u32, 101u32]),
        (
            PluralCategory::Other,
            vec![6u32, 7u32, 8u32, 9u32, 10u32, 25u32, 100u32, 1000u32],
        ),
    ];

    let mut forms = Vec::new();
    for (expected_category, test_values) in test_values_by_category.iter() {
        for &test_value in test_values {
            if pr.category_for(test_value as usize) == *expected_category {
                forms.push(PluralForm {
                    category: *expected_category,
                    test_value,
                });
                break;
            }
        }
    }

    Ok(forms)
}

/// Number of translation variants a plural message needs in `code`.
///
/// An empty code or the `C` pseudo-language means one form.
pub fn plural_form_count(code: &str) -> CatalogResult<usize> {
    let (language, _) = language_and_territory(code);
    if language.is_empty() || language == "C" {
        return Ok(1);
    }
    let forms = get_plural_forms_for_language(code)?;
    Ok(forms.len().max(1))
}
