//! The fixed bank of characters a learner can study.
//!
//! A [`Catalog`] is built once at startup, either from the bundled list
//! ([`Catalog::builtin`]) or from a JSON file of character records
//! ([`Catalog::load`]), and is never mutated afterwards.
//!
//! # JSON Layout
//!
//! ```text
//! [
//!   { "id": 1, "char": "人", "pinyin": "ren2", "words": ["人们", "大人"] },
//!   ...
//! ]
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate character id {0}")]
    DuplicateId(u32),
    #[error("Character {id} must be a single glyph, got {glyph:?}")]
    InvalidGlyph { id: u32, glyph: String },
}

/// A single learnable character with its pronunciation and example words.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: u32,
    #[serde(rename = "char")]
    pub glyph: String,
    pub pinyin: String,
    #[serde(default)]
    pub words: Vec<String>,
}

impl Character {
    pub fn new(id: u32, glyph: &str, pinyin: &str, words: &[&str]) -> Self {
        Self {
            id,
            glyph: glyph.to_string(),
            pinyin: pinyin.to_string(),
            words: words.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Whether this character matches a search term typed on the selection screen.
    ///
    /// The glyph is matched as typed, pinyin is matched against the lowercased term.
    pub fn matches(&self, term: &str) -> bool {
        self.glyph.contains(term) || self.pinyin.contains(&term.to_lowercase())
    }
}

/// Immutable list of characters with unique ids.
#[derive(Debug, Clone)]
pub struct Catalog {
    characters: Vec<Character>,
    /// Indices into `characters` in display order (pinyin, then id).
    sorted: Vec<usize>,
}

impl Catalog {
    pub fn new(characters: Vec<Character>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(characters.len());
        for ch in &characters {
            if !seen.insert(ch.id) {
                return Err(CatalogError::DuplicateId(ch.id));
            }
            if ch.glyph.trim().chars().count() != 1 {
                return Err(CatalogError::InvalidGlyph {
                    id: ch.id,
                    glyph: ch.glyph.clone(),
                });
            }
        }
        Ok(Self::with_display_order(characters))
    }

    fn with_display_order(characters: Vec<Character>) -> Self {
        let mut sorted: Vec<usize> = (0..characters.len()).collect();
        sorted.sort_by(|&a, &b| {
            let (a, b) = (&characters[a], &characters[b]);
            a.pinyin.cmp(&b.pinyin).then(a.id.cmp(&b.id))
        });

        Self { characters, sorted }
    }

    /// Load a catalog from a JSON array of character records.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let characters: Vec<Character> = serde_json::from_str(&content)?;
        log::info!(
            "Loaded {} characters from {}",
            characters.len(),
            path.display()
        );
        Self::new(characters)
    }

    /// The bundled catalog of common characters.
    pub fn builtin() -> Self {
        let characters = BUILTIN
            .iter()
            .enumerate()
            .map(|(i, (glyph, pinyin, words))| Character::new(i as u32 + 1, glyph, pinyin, words))
            .collect();
        // Ids are sequential and every bundled glyph is a single character.
        Self::with_display_order(characters)
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Position of `id` in source order.
    pub fn position(&self, id: u32) -> Option<usize> {
        self.characters.iter().position(|c| c.id == id)
    }

    pub fn at(&self, index: usize) -> Option<&Character> {
        self.characters.get(index)
    }

    /// Characters in source order.
    pub fn iter(&self) -> impl Iterator<Item = &Character> {
        self.characters.iter()
    }

    /// Characters in display order.
    pub fn sorted(&self) -> impl Iterator<Item = &Character> {
        self.sorted.iter().map(|&i| &self.characters[i])
    }

    /// Characters in display order that match `term`. An empty term matches all.
    pub fn filter(&self, term: &str) -> Vec<&Character> {
        self.sorted().filter(|c| c.matches(term)).collect()
    }
}

const BUILTIN: &[(&str, &str, &[&str])] = &[
    ("一", "yi1", &["一个", "一起"]),
    ("二", "er4", &["二月", "十二"]),
    ("三", "san1", &["三天", "三月"]),
    ("人", "ren2", &["人们", "大人"]),
    ("大", "da4", &["大家", "大小"]),
    ("小", "xiao3", &["小鸟", "小心"]),
    ("上", "shang4", &["上学", "上面"]),
    ("下", "xia4", &["下雨", "下面"]),
    ("山", "shan1", &["山水", "高山"]),
    ("水", "shui3", &["喝水", "水果"]),
    ("火", "huo3", &["火车", "大火"]),
    ("木", "mu4", &["木头", "树木"]),
    ("日", "ri4", &["日子", "生日"]),
    ("月", "yue4", &["月亮", "月饼"]),
    ("天", "tian1", &["天气", "今天"]),
    ("中", "zhong1", &["中国", "中间"]),
    ("口", "kou3", &["门口", "口水"]),
    ("手", "shou3", &["手机", "小手"]),
    ("目", "mu4", &["目光", "题目"]),
    ("耳", "er3", &["耳朵", "木耳"]),
    ("田", "tian2", &["田地", "种田"]),
    ("土", "tu3", &["土地", "泥土"]),
    ("花", "hua1", &["花朵", "开花"]),
    ("鸟", "niao3", &["小鸟", "鸟巢"]),
    ("鱼", "yu2", &["金鱼", "鱼儿"]),
    ("马", "ma3", &["马上", "小马"]),
    ("牛", "niu2", &["牛奶", "黄牛"]),
    ("羊", "yang2", &["山羊", "羊毛"]),
    ("米", "mi3", &["大米", "米饭"]),
    ("门", "men2", &["大门", "开门"]),
    ("我", "wo3", &["我们", "自我"]),
    ("你", "ni3", &["你好", "你们"]),
    ("他", "ta1", &["他们", "其他"]),
    ("好", "hao3", &["好人", "你好"]),
    ("学", "xue2", &["学生", "上学"]),
    ("书", "shu1", &["看书", "书包"]),
    ("家", "jia1", &["家人", "大家"]),
    ("爱", "ai4", &["爱心", "可爱"]),
    ("看", "kan4", &["看见", "好看"]),
    ("字", "zi4", &["汉字", "写字"]),
];
