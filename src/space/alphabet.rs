//! The fixed, ordered sjzip alphabet.
//!
//! The alphabet is the root of the whole codec: every character that can be
//! encoded has exactly one dense index in `[0, N)`, and every index has exactly
//! one character. It is built once per process and never mutated, so it is
//! shared through a `OnceLock` without any further synchronization.

use hashbrown::HashMap;
use std::sync::OnceLock;

use crate::error::SjzipError;
use crate::space::front::Front;

//==================================================================================
// 1. Character Sets
//==================================================================================

/// Common Hangul jamo and syllables. Duplicates are intentional in the source
/// list (frequent-word syllables repeat earlier entries) and are removed when
/// the alphabet is built.
const HANGUL: &[char] = &[
    // Jamo
    'ㄱ', 'ㄴ', 'ㄷ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅅ', 'ㅇ', 'ㅈ', 'ㅊ', 'ㅋ', 'ㅌ', 'ㅍ', 'ㅎ',
    'ㅏ', 'ㅐ', 'ㅑ', 'ㅒ', 'ㅓ', 'ㅔ', 'ㅕ', 'ㅖ', 'ㅗ', 'ㅛ', 'ㅜ', 'ㅠ', 'ㅡ', 'ㅣ',
    // Syllables by vowel
    '가', '나', '다', '라', '마', '바', '사', '아', '자', '차', '카', '타', '파', '하',
    '고', '노', '도', '로', '모', '보', '소', '오', '조', '초', '코', '토', '포', '호',
    '구', '누', '두', '루', '무', '부', '수', '우', '주', '추', '쿠', '투', '푸', '후',
    '그', '는', '드', '르', '므', '브', '스', '으', '즈', '츠', '크', '트', '프', '흐',
    '기', '니', '디', '리', '미', '비', '시', '이', '지', '치', '키', '티', '피', '히',
    // Frequent-word syllables
    '안', '녕', '하', '세', '요', '습', '니', '다', '입', '것', '은', '를', '의', '에',
    '와', '과', '할', '수', '있', '었', '였', '을', '를', '이', '가', '에', '서', '도',
    '지', '만', '까', '를', '위', '해', '되', '된', '한', '합', '같', '음', '임', '함',
];

/// Whitespace controls, Latin-1, Greek, Hebrew and typographic punctuation.
const SYMBOLS: &[char] = &[
    '\r', '\n', '\t', '£', 'â', 'æ', 'è', 'é', 'Œ', 'œ', 'η', 'ο', 'σ', 'τ', 'ς', 'ϰ', 'ו',
    'ח', '—', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '•', '™',
];

/// NUL followed by printable ASCII `0x20..=0x7E`.
fn base_chars() -> impl Iterator<Item = char> {
    std::iter::once('\0').chain((0x20u8..=0x7E).map(char::from))
}

//==================================================================================
// 2. The Alphabet
//==================================================================================

/// A contiguous run of alphabet indices owned by one front.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontRange {
    pub front: Front,
    pub start: usize,
    pub len: usize,
}

#[derive(Debug)]
pub struct Alphabet {
    chars: Vec<char>,
    index: HashMap<char, u16>,
    ranges: Vec<FrontRange>,
}

static ALPHABET: OnceLock<Alphabet> = OnceLock::new();

impl Alphabet {
    /// The process-wide alphabet, built on first use.
    pub fn global() -> &'static Alphabet {
        ALPHABET.get_or_init(Alphabet::build)
    }

    fn build() -> Self {
        let groups: [(Front, Vec<char>); 3] = [
            (Front::Base, base_chars().collect()),
            (Front::Hangul, HANGUL.to_vec()),
            (Front::Symbol, SYMBOLS.to_vec()),
        ];

        let mut chars = Vec::new();
        let mut index = HashMap::new();
        let mut ranges = Vec::with_capacity(groups.len());

        for (front, group) in groups {
            let start = chars.len();
            for ch in group {
                if index.contains_key(&ch) {
                    continue;
                }
                // The alphabet is a few hundred characters, far below u16::MAX.
                index.insert(ch, chars.len() as u16);
                chars.push(ch);
            }
            ranges.push(FrontRange {
                front,
                start,
                len: chars.len() - start,
            });
        }

        Self {
            chars,
            index,
            ranges,
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn contains(&self, ch: char) -> bool {
        self.index.contains_key(&ch)
    }

    /// All characters in index order.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// The index ranges of every front, in index order.
    pub fn front_ranges(&self) -> &[FrontRange] {
        &self.ranges
    }

    /// Looks up the dense index of `ch`.
    ///
    /// The reported position is 0 because a lone character has no context;
    /// use [`Alphabet::validate_text`] to locate a character inside a text.
    pub fn index_of(&self, ch: char) -> Result<usize, SjzipError> {
        self.index
            .get(&ch)
            .map(|&i| i as usize)
            .ok_or(SjzipError::UnsupportedCharacter { ch, position: 0 })
    }

    pub fn char_of(&self, index: usize) -> Result<char, SjzipError> {
        self.chars
            .get(index)
            .copied()
            .ok_or(SjzipError::IndexOutOfRange {
                index,
                size: self.chars.len(),
            })
    }

    /// Looks up every character of `text`, tagging failures with the
    /// character position.
    fn lookup<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Result<u16, SjzipError>> + 'a {
        text.chars().enumerate().map(|(position, ch)| {
            self.index
                .get(&ch)
                .copied()
                .ok_or(SjzipError::UnsupportedCharacter { ch, position })
        })
    }

    /// Converts a whole text into alphabet indices, reporting the character
    /// position of the first unsupported character.
    pub fn indices_of(&self, text: &str) -> Result<Vec<u16>, SjzipError> {
        self.lookup(text).collect()
    }

    /// Checks that every character of `text` is supported and returns the
    /// character count. Same errors as [`Alphabet::indices_of`], without
    /// allocating the index vector.
    pub fn validate_text(&self, text: &str) -> Result<usize, SjzipError> {
        self.lookup(text).try_fold(0usize, |count, index| index.map(|_| count + 1))
    }
}
