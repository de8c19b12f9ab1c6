// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Built-in plural rules.
//!
//! The formulas are the ones shipped with GNU gettext. Each rule also
//! lists the CLDR category of every form index so that i18next keys
//! can use category suffixes.

pub(super) struct BuiltinRule {
    pub languages: &'static [&'static str],
    pub nplurals: usize,
    pub plural: &'static str,
    pub categories: &'static [&'static str],
}

const ONE_OTHER: &[&str] = &["one", "other"];

pub(super) const BUILTIN_RULES: &[BuiltinRule] = &[
    BuiltinRule {
        languages: &[
            "ay", "bo", "cgg", "dz", "id", "ja", "jbo", "ka", "km", "ko", "lo", "ms", "my", "sah",
            "su", "th", "tt", "ug", "vi", "wo", "zh",
        ],
        nplurals: 1,
        plural: "0",
        categories: &["other"],
    },
    BuiltinRule {
        languages: &[
            "af", "an", "anp", "as", "ast", "az", "bg", "bn", "brx", "ca", "da", "de", "doi", "el",
            "en", "eo", "es", "et", "eu", "fi", "fo", "fur", "fy", "gl", "gu", "ha", "he", "hi",
            "hu", "hy", "ia", "it", "kk", "kl", "kn", "ku", "ky", "lb", "mai", "ml", "mn", "mni",
            "mr", "nah", "nap", "nb", "ne", "nl", "nn", "no", "nso", "or", "pa", "pap", "pms",
            "ps", "pt", "rm", "sat", "sco", "sd", "si", "so", "son", "sq", "sv", "sw", "ta", "te",
            "tk", "ur", "yo",
        ],
        nplurals: 2,
        plural: "(n != 1)",
        categories: ONE_OTHER,
    },
    BuiltinRule {
        languages: &[
            "ach", "ak", "am", "arn", "br", "fa", "fil", "fr", "gun", "ln", "mfe", "mg", "mi",
            "oc", "pt_br", "tg", "ti", "tr", "uz", "wa",
        ],
        nplurals: 2,
        plural: "(n > 1)",
        categories: ONE_OTHER,
    },
    BuiltinRule {
        languages: &["is"],
        nplurals: 2,
        plural: "(n%10!=1 || n%100==11)",
        categories: ONE_OTHER,
    },
    BuiltinRule {
        languages: &["mk"],
        nplurals: 2,
        plural: "(n==1 || n%10==1 ? 0 : 1)",
        categories: ONE_OTHER,
    },
    BuiltinRule {
        languages: &["be", "bs", "hr", "ru", "sr", "uk"],
        nplurals: 3,
        plural: "(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2)",
        categories: &["one", "few", "many"],
    },
    BuiltinRule {
        languages: &["cs", "sk"],
        nplurals: 3,
        plural: "(n==1) ? 0 : (n>=2 && n<=4) ? 1 : 2",
        categories: &["one", "few", "other"],
    },
    BuiltinRule {
        languages: &["pl"],
        nplurals: 3,
        plural: "(n==1 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2)",
        categories: &["one", "few", "many"],
    },
    BuiltinRule {
        languages: &["lt"],
        nplurals: 3,
        plural: "(n%10==1 && n%100!=11 ? 0 : n%10>=2 && (n%100<10 || n%100>=20) ? 1 : 2)",
        categories: &["one", "few", "other"],
    },
    BuiltinRule {
        languages: &["lv"],
        nplurals: 3,
        plural: "(n%10==1 && n%100!=11 ? 0 : n != 0 ? 1 : 2)",
        categories: &["one", "other", "zero"],
    },
    BuiltinRule {
        languages: &["ro"],
        nplurals: 3,
        plural: "(n==1 ? 0 : (n==0 || (n%100 > 0 && n%100 < 20)) ? 1 : 2)",
        categories: &["one", "few", "other"],
    },
    BuiltinRule {
        languages: &["me"],
        nplurals: 3,
        plural: "(n%10==1 && n%100!=11 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2)",
        categories: &["one", "few", "other"],
    },
    BuiltinRule {
        languages: &["sl"],
        nplurals: 4,
        plural: "(n%100==1 ? 0 : n%100==2 ? 1 : n%100==3 || n%100==4 ? 2 : 3)",
        categories: &["one", "two", "few", "other"],
    },
    BuiltinRule {
        languages: &["cy"],
        nplurals: 4,
        plural: "(n==1) ? 0 : (n==2) ? 1 : (n != 8 && n != 11) ? 2 : 3",
        categories: &["one", "two", "few", "other"],
    },
    BuiltinRule {
        languages: &["mt"],
        nplurals: 4,
        plural: "(n==1 ? 0 : n==0 || ( n%100>1 && n%100<11) ? 1 : (n%100>10 && n%100<20 ) ? 2 : 3)",
        categories: &["one", "few", "many", "other"],
    },
    BuiltinRule {
        languages: &["gd"],
        nplurals: 4,
        plural: "(n==1 || n==11) ? 0 : (n==2 || n==12) ? 1 : (n > 2 && n < 20) ? 2 : 3",
        categories: &["one", "two", "few", "other"],
    },
    BuiltinRule {
        languages: &["ga"],
        nplurals: 5,
        plural: "n==1 ? 0 : n==2 ? 1 : (n>2 && n<7) ? 2 :(n>6 && n<11) ? 3 : 4",
        categories: &["one", "two", "few", "many", "other"],
    },
    BuiltinRule {
        languages: &["ar"],
        nplurals: 6,
        plural: "(n==0 ? 0 : n==1 ? 1 : n==2 ? 2 : n%100>=3 && n%100<=10 ? 3 : n%100>=11 ? 4 : 5)",
        categories: &["zero", "one", "two", "few", "many", "other"],
    },
];

/// Find the built-in rule for a normalized language code.
pub(super) fn lookup(language: &str) -> Option<&'static BuiltinRule> {
    BUILTIN_RULES
        .iter()
        .find(|rule| rule.languages.contains(&language))
}
