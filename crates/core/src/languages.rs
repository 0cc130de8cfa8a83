//! Reaction → language resolution.
//!
//! A reaction name such as `jp` or `flag-jp` is first normalized to the
//! platform's flag identifier, mapped to a human-readable language name, and
//! then to the translation backend's language code. Both tables are static;
//! a miss at either step means the reaction does not denote a supported
//! language.

pub const FLAG_PREFIX: &str = "flag-";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedLanguage {
    pub flag: &'static str,
    pub language_name: &'static str,
    pub code: &'static str,
}

/// Resolve a reaction name to the translation code of the language its flag
/// stands for.
pub fn resolve(reaction: &str) -> Option<&'static str> {
    resolve_language(reaction).map(|resolved| resolved.code)
}

pub fn resolve_language(reaction: &str) -> Option<ResolvedLanguage> {
    let (flag, language_name) = flag_entry(&normalize_reaction(reaction))?;
    let code = language_code(language_name).filter(|code| !code.is_empty())?;
    Some(ResolvedLanguage { flag, language_name, code })
}

/// Language name the flag is mapped to, even when no translation code exists
/// for it.
pub fn language_name(reaction: &str) -> Option<&'static str> {
    flag_entry(&normalize_reaction(reaction))
        .map(|(_, language_name)| language_name)
        .filter(|language_name| !language_name.is_empty())
}

pub fn normalize_reaction(reaction: &str) -> String {
    if reaction.starts_with(FLAG_PREFIX) {
        reaction.to_owned()
    } else {
        format!("{FLAG_PREFIX}{reaction}")
    }
}

pub fn is_supported_code(code: &str) -> bool {
    supported_codes().any(|supported| supported == code)
}

/// Closed set of target codes reachable through some flag.
pub fn supported_codes() -> impl Iterator<Item = &'static str> {
    let mut codes = FLAG_LANGUAGES
        .iter()
        .filter_map(|(_, language_name)| language_code(language_name))
        .collect::<Vec<_>>();
    codes.sort_unstable();
    codes.dedup();
    codes.into_iter()
}

fn flag_entry(flag: &str) -> Option<(&'static str, &'static str)> {
    FLAG_LANGUAGES
        .binary_search_by(|(candidate, _)| (*candidate).cmp(flag))
        .ok()
        .map(|index| FLAG_LANGUAGES[index])
}

/// Translation backend code for a language name.
pub fn language_code(language_name: &str) -> Option<&'static str> {
    let code = match language_name {
        "Afrikaans" => "af",
        "Albanian" => "sq",
        "Arabic" => "ar",
        "Armenian" => "hy",
        "Bengali" => "bn",
        "Bosnian" => "bs",
        "Bulgarian" => "bg",
        "Catalan" => "ca",
        "Chinese Simplified" => "zh",
        "Chinese Traditional" => "zh-TW",
        "Croatian" => "hr",
        "Czech" => "cs",
        "Danish" => "da",
        "Dutch" => "nl",
        "English" => "en",
        "Estonian" => "et",
        "Finnish" => "fi",
        "French" => "fr",
        "Georgian" => "ka",
        "German" => "de",
        "Greek" => "el",
        "Haitian Creole" => "ht",
        "Hebrew" => "he",
        "Hindi" => "hi",
        "Hungarian" => "hu",
        "Icelandic" => "is",
        "Indonesian" => "id",
        "Irish" => "ga",
        "Italian" => "it",
        "Japanese" => "ja",
        "Kazakh" => "kk",
        "Korean" => "ko",
        "Latvian" => "lv",
        "Lithuanian" => "lt",
        "Macedonian" => "mk",
        "Malay" => "ms",
        "Maltese" => "mt",
        "Mongolian" => "mn",
        "Norwegian" => "no",
        "Pashto" => "ps",
        "Persian" => "fa",
        "Polish" => "pl",
        "Portuguese" => "pt",
        "Romanian" => "ro",
        "Russian" => "ru",
        "Serbian" => "sr",
        "Sinhala" => "si",
        "Slovak" => "sk",
        "Slovenian" => "sl",
        "Somali" => "so",
        "Spanish" => "es",
        "Swahili" => "sw",
        "Swedish" => "sv",
        "Tagalog" => "tl",
        "Thai" => "th",
        "Turkish" => "tr",
        "Ukrainian" => "uk",
        "Urdu" => "ur",
        "Uzbek" => "uz",
        "Vietnamese" => "vi",
        _ => return None,
    };
    Some(code)
}

// Sorted by flag identifier; `flag_entry` binary-searches it.
static FLAG_LANGUAGES: &[(&str, &str)] = &[
    ("flag-ac", "English"),
    ("flag-ad", "Catalan"),
    ("flag-ae", "Arabic"),
    ("flag-af", "Pashto"),
    ("flag-ag", "English"),
    ("flag-ai", "English"),
    ("flag-al", "Albanian"),
    ("flag-am", "Armenian"),
    ("flag-ao", "Portuguese"),
    ("flag-aq", "Antarctica"),
    ("flag-ar", "Spanish"),
    ("flag-as", "English"),
    ("flag-at", "German"),
    ("flag-au", "English"),
    ("flag-aw", "Dutch"),
    ("flag-ax", "Swedish"),
    ("flag-az", "Spanish"),
    ("flag-ba", "Bosnian"),
    ("flag-bb", "English"),
    ("flag-bd", "Bengali"),
    ("flag-be", "Dutch"),
    ("flag-bf", "French"),
    ("flag-bg", "Bulgarian"),
    ("flag-bh", "Arabic"),
    ("flag-bi", "French"),
    ("flag-bj", "French"),
    ("flag-bl", "French"),
    ("flag-bm", "Malay"),
    ("flag-bn", "English"),
    ("flag-bo", "Spanish"),
    ("flag-bq", "Dutch"),
    ("flag-br", "Portuguese"),
    ("flag-bs", "English"),
    ("flag-bt", "Dzongkha"),
    ("flag-bv", "Norwegian"),
    ("flag-bw", "English"),
    ("flag-by", "Belarusian"),
    ("flag-bz", "English"),
    ("flag-ca", "English"),
    ("flag-cc", "Malay"),
    ("flag-cd", "French"),
    ("flag-cf", "French"),
    ("flag-cg", "French"),
    ("flag-ch", "German"),
    ("flag-ci", "French"),
    ("flag-ck", "English"),
    ("flag-cl", "Spanish"),
    ("flag-cm", "French"),
    ("flag-cn", "Chinese Simplified"),
    ("flag-co", "Spanish"),
    ("flag-cp", "French"),
    ("flag-cr", "Spanish"),
    ("flag-cu", "Spanish"),
    ("flag-cv", "Portuguese"),
    ("flag-cw", "Dutch"),
    ("flag-cx", "English"),
    ("flag-cy", "Greek"),
    ("flag-cz", "Czech"),
    ("flag-de", "German"),
    ("flag-dg", "English"),
    ("flag-dj", "French"),
    ("flag-dk", "Danish"),
    ("flag-dm", "English"),
    ("flag-do", "Spanish"),
    ("flag-dz", "Arabic"),
    ("flag-ea", "Spanish"),
    ("flag-ec", "Spanish"),
    ("flag-ee", "Estonian"),
    ("flag-eg", "Arabic"),
    ("flag-eh", "Arabic"),
    ("flag-er", "Arabic"),
    ("flag-es", "Spanish"),
    ("flag-et", "Oromo"),
    ("flag-eu", "EU"),
    ("flag-fi", "Finnish"),
    ("flag-fj", "English"),
    ("flag-fk", "English"),
    ("flag-fm", "English"),
    ("flag-fo", "Faroe Islands"),
    ("flag-fr", "French"),
    ("flag-ga", "French"),
    ("flag-gb", "English"),
    ("flag-gd", "English"),
    ("flag-ge", "Georgian"),
    ("flag-gf", "French"),
    ("flag-gg", "English"),
    ("flag-gh", "English"),
    ("flag-gi", "English"),
    ("flag-gl", "Danish"),
    ("flag-gm", "English"),
    ("flag-gn", "French"),
    ("flag-gp", "French"),
    ("flag-gq", "Spanish"),
    ("flag-gr", "Greek"),
    ("flag-gs", "English"),
    ("flag-gt", "Spanish"),
    ("flag-gu", "English"),
    ("flag-gw", "Portuguese"),
    ("flag-gy", "English"),
    ("flag-hk", "Chinese Traditional"),
    ("flag-hm", ""),
    ("flag-hn", "Spanish"),
    ("flag-hr", "Croatian"),
    ("flag-ht", "Haitian Creole"),
    ("flag-hu", "Hungarian"),
    ("flag-ic", "Spanish"),
    ("flag-id", "Indonesian"),
    ("flag-ie", "Irish"),
    ("flag-il", "Hebrew"),
    ("flag-im", "English"),
    ("flag-in", "Hindi"),
    ("flag-io", "English"),
    ("flag-iq", "Arabic"),
    ("flag-ir", "Persian"),
    ("flag-is", "Icelandic"),
    ("flag-it", "Italian"),
    ("flag-je", "English"),
    ("flag-jm", "English"),
    ("flag-jo", "Arabic"),
    ("flag-jp", "Japanese"),
    ("flag-ke", "English"),
    ("flag-kg", "Kyrgyz"),
    ("flag-kh", "Khmer"),
    ("flag-ki", "English"),
    ("flag-km", ""),
    ("flag-kn", "English"),
    ("flag-kp", "Korean"),
    ("flag-kr", "Korean"),
    ("flag-kw", "Arabic"),
    ("flag-ky", "English"),
    ("flag-kz", "Kazakh"),
    ("flag-la", "Lao"),
    ("flag-lb", "Arabic"),
    ("flag-lc", "English"),
    ("flag-li", "German"),
    ("flag-lk", "Sinhala"),
    ("flag-lr", "English"),
    ("flag-ls", "Sesotho"),
    ("flag-lt", "Lithuanian"),
    ("flag-lu", "Luxembourgish"),
    ("flag-lv", "Latvian"),
    ("flag-ly", "Arabic"),
    ("flag-ma", "Arabic"),
    ("flag-mc", "French"),
    ("flag-md", "Romanian"),
    ("flag-me", ""),
    ("flag-mf", "Saint Martin"),
    ("flag-mg", "Malagasy"),
    ("flag-mh", "Marshallese"),
    ("flag-mk", "Macedonian"),
    ("flag-ml", "French"),
    ("flag-mm", "Burmese"),
    ("flag-mn", "Mongolian"),
    ("flag-mo", "Chinese Traditional"),
    ("flag-mp", "English"),
    ("flag-mq", "French"),
    ("flag-mr", "Arabic"),
    ("flag-ms", "English"),
    ("flag-mt", "Maltese"),
    ("flag-mu", "English"),
    ("flag-mv", "Dhivehi"),
    ("flag-mw", "English"),
    ("flag-mx", "Spanish"),
    ("flag-my", "Malay"),
    ("flag-mz", "Portuguese"),
    ("flag-na", "English"),
    ("flag-nc", "French"),
    ("flag-ne", "French"),
    ("flag-nf", "English"),
    ("flag-ng", "English"),
    ("flag-ni", "Spanish"),
    ("flag-nl", "Dutch"),
    ("flag-no", "Norwegian"),
    ("flag-np", "Nepali"),
    ("flag-nr", "Nauru"),
    ("flag-nu", "Niuean"),
    ("flag-nz", "English"),
    ("flag-om", "Arabic"),
    ("flag-pa", "Spanish"),
    ("flag-pe", "Spanish"),
    ("flag-pf", "French"),
    ("flag-pg", "English"),
    ("flag-ph", "Tagalog"),
    ("flag-pk", "Urdu"),
    ("flag-pl", "Polish"),
    ("flag-pm", "French"),
    ("flag-pn", "English"),
    ("flag-pr", "Spanish"),
    ("flag-ps", "Arabic"),
    ("flag-pt", "Portuguese"),
    ("flag-pw", "English"),
    ("flag-py", "Spanish"),
    ("flag-qa", "Arabic"),
    ("flag-re", "French"),
    ("flag-ro", "Romanian"),
    ("flag-rs", "Serbian"),
    ("flag-ru", "Russian"),
    ("flag-rw", "Kinyarwanda"),
    ("flag-sa", "Arabic"),
    ("flag-sb", "English"),
    ("flag-sc", "English"),
    ("flag-sd", "Arabic"),
    ("flag-se", "Swedish"),
    ("flag-sg", "English"),
    ("flag-sh", "English"),
    ("flag-si", "Slovenian"),
    ("flag-sj", "Norwegian"),
    ("flag-sk", "Slovak"),
    ("flag-sl", "English"),
    ("flag-sm", "Italian"),
    ("flag-sn", "French"),
    ("flag-so", "Somali"),
    ("flag-sr", "Dutch"),
    ("flag-ss", "English"),
    ("flag-st", "Portuguese"),
    ("flag-sv", "Spanish"),
    ("flag-sw", "Arabic"),
    ("flag-sx", "Dutch"),
    ("flag-sz", "Swati"),
    ("flag-ta", "English"),
    ("flag-tc", "English"),
    ("flag-td", "French"),
    ("flag-tf", "French"),
    ("flag-tg", "French"),
    ("flag-th", "Thai"),
    ("flag-tj", "Tajik"),
    ("flag-tk", "Tokelau"),
    ("flag-tl", "Tetum"),
    ("flag-tm", "Turkmen"),
    ("flag-tn", "Arabic"),
    ("flag-to", ""),
    ("flag-tr", "Turkish"),
    ("flag-tt", "English"),
    ("flag-tv", "Tuvalua"),
    ("flag-tw", "Chinese Traditional"),
    ("flag-tz", "Swahili"),
    ("flag-ua", "Ukrainian"),
    ("flag-ug", "English"),
    ("flag-um", "English"),
    ("flag-us", "English"),
    ("flag-uy", "Spanish"),
    ("flag-uz", "Uzbek"),
    ("flag-va", "Italian"),
    ("flag-vc", "English"),
    ("flag-ve", "Spanish"),
    ("flag-vg", "English"),
    ("flag-vi", "English"),
    ("flag-vn", "Vietnamese"),
    ("flag-vu", "English"),
    ("flag-wf", "French"),
    ("flag-ws", "Samoan"),
    ("flag-xk", "Albanian"),
    ("flag-ye", "Arabic"),
    ("flag-yt", "French"),
    ("flag-za", "Afrikaans"),
    ("flag-zm", "English"),
    ("flag-zw", "English"),
];
