//! Keyword heuristic mapping product names onto the fixed taxonomy.
//!
//! Rules are checked in declaration order and the first category with a
//! keyword contained in the lowercased name wins, so "green chilli" lands in
//! whichever of vegetables/spices is declared first.

use crate::types::Category;

/// Default keyword table. Devanagari entries cover the Nepali bulletin.
const DEFAULT_RULES: &[(Category, &[&str])] = &[
    (
        Category::Fruits,
        &[
            "apple", "banana", "orange", "mango", "grape", "papaya", "pineapple", "guava",
            "pomegranate", "lemon", "lime", "kiwi", "watermelon", "melon", "litchi", "pear",
            "strawberry", "sugarcane", "mausam", "sweet lime", "jackfruit", "avocado", "peach",
            "स्याउ", "केरा", "सुन्तला", "आँप", "अंगुर", "मेवा", "भुइँकटहर", "अम्बा", "कागती", "तरबुजा",
            "लिची", "नासपाती", "अनार", "किवि", "मौसम",
        ],
    ),
    (
        Category::Vegetables,
        &[
            "tomato", "potato", "onion", "cabbage", "cauli", "carrot", "radish",
            "brinjal", "eggplant", "okra", "bitter gourd", "bottle gourd", "gourd", "pumpkin",
            "cucumber", "spinach", "mustard leaf", "broccoli", "capsicum", "bell pepper",
            "green pea", "pea pod", "snow pea", "french bean", "green bean", "broad bean",
            "string bean", "bean sprout",
            "mushroom", "lettuce", "turnip", "squash", "yam", "taro", "bamboo", "fern",
            "asparagus", "leek", "celery", "drumstick",
            "गोलभेडा", "आलु", "प्याज", "बन्दा", "काउली", "गाजर", "मूला", "भन्टा", "भिण्डी",
            "करेला", "लौका", "फर्सी", "काँक्रो", "पालुङ्गो", "साग", "ब्रोकाउली", "भेडे खुर्सानी",
            "सिमी", "च्याउ", "सलगम", "स्कूस", "पिंडालु", "तामा", "निउरो", "सेलरी",
        ],
    ),
    (
        Category::Spices,
        &[
            "chilli", "chili", "ginger", "garlic", "coriander", "turmeric", "cumin", "pepper",
            "cardamom", "clove", "cinnamon", "fenugreek", "mint", "timur", "basil", "khursani",
            "खुर्सानी", "अदुवा", "लसुन", "धनियाँ", "बेसार", "जीरा", "मरिच", "अलैंची", "ल्वाङ",
            "दालचिनी", "मेथी", "पुदिना", "टिमुर", "तुलसी",
        ],
    ),
    (
        Category::Grains,
        &[
            "rice", "wheat", "maize", "corn", "millet", "barley", "buckwheat", "lentil", "dal",
            "gram", "soybean", "chickpea", "flour", "oats",
            "चामल", "गहुँ", "मकै", "कोदो", "जौ", "फापर", "दाल", "चना", "भटमास", "पीठो",
        ],
    ),
];

/// Ordered category → keyword rules, immutable once built.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<(Category, Vec<String>)>,
}

impl Classifier {
    /// Builds a classifier from custom rules. Keywords are lowercased here so
    /// matching only lowercases the input name.
    pub fn new(rules: Vec<(Category, Vec<String>)>) -> Self {
        let rules = rules
            .into_iter()
            .map(|(category, keywords)| {
                let keywords = keywords
                    .into_iter()
                    .map(|k| k.trim().to_lowercase())
                    .filter(|k| !k.is_empty())
                    .collect();
                (category, keywords)
            })
            .collect();
        Self { rules }
    }

    pub fn classify(&self, name: &str) -> Category {
        let lowered = name.to_lowercase();
        self.rules
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k.as_str())))
            .map(|(category, _)| *category)
            .unwrap_or(Category::Others)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(
            DEFAULT_RULES
                .iter()
                .map(|(category, keywords)| {
                    (*category, keywords.iter().map(|k| k.to_string()).collect())
                })
                .collect(),
        )
    }
}
