//! Mention Linker - finds registered names inside free text.
//!
//! The frozen [`Registry`] compiles once into a [`TextMatcher`]. A scan
//! returns non-overlapping, whole-word occurrences; when candidates overlap
//! the longest wins, then the leftmost. [`MentionLinker::link`] reduces the
//! occurrences of one text to the set of distinct targets it mentions.

mod automaton;

pub use automaton::{Automaton, Hit};

use lore_model::Identifier;
use std::collections::{BTreeMap, BTreeSet};

use crate::registry::Registry;

/// One selected occurrence of a registered name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Match {
    /// Byte offsets into the scanned text.
    pub start: usize,
    pub end: usize,
    pub target: Identifier,
}

impl Match {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Multi-target text scanning.
///
/// Implementations must be deterministic: the same text against the same
/// compiled names always yields the same matches.
pub trait TextMatcher: Send + Sync {
    /// Non-overlapping whole-word matches, ordered by start offset.
    fn find_matches(&self, text: &str) -> Vec<Match>;
}

/// [`TextMatcher`] backed by an Aho-Corasick automaton.
#[derive(Debug, Clone)]
pub struct AhoCorasickMatcher {
    automaton: Automaton,
    targets: Vec<Identifier>,
}

impl AhoCorasickMatcher {
    pub fn new<'a>(patterns: impl IntoIterator<Item = (&'a str, &'a Identifier)>) -> Self {
        let (names, targets): (Vec<&str>, Vec<Identifier>) = patterns
            .into_iter()
            .map(|(name, id)| (name, id.clone()))
            .unzip();
        Self {
            automaton: Automaton::new(names),
            targets,
        }
    }

    pub fn pattern_count(&self) -> usize {
        self.targets.len()
    }
}

impl TextMatcher for AhoCorasickMatcher {
    fn find_matches(&self, text: &str) -> Vec<Match> {
        let candidates = self
            .automaton
            .find_overlapping(text.as_bytes())
            .into_iter()
            .filter(|hit| is_whole_word(text, hit.start, hit.end))
            .map(|hit| Match {
                start: hit.start,
                end: hit.end,
                target: self.targets[hit.pattern].clone(),
            })
            .collect();
        select_longest(candidates)
    }
}

/// Both neighbours of the span are absent or non-alphanumeric.
pub fn is_whole_word(text: &str, start: usize, end: usize) -> bool {
    let before = text.get(..start).and_then(|s| s.chars().next_back());
    let after = text.get(end..).and_then(|s| s.chars().next());
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// Greedy overlap resolution: longest first, then leftmost, then target
/// order. The kept matches are returned by start offset.
///
/// Kept spans are disjoint, so they are indexed by start; a candidate can
/// only collide with the kept span starting at or before it and the first
/// one starting after it.
pub fn select_longest(mut candidates: Vec<Match>) -> Vec<Match> {
    candidates.sort_by(|a, b| {
        b.len()
            .cmp(&a.len())
            .then(a.start.cmp(&b.start))
            .then(a.target.cmp(&b.target))
    });

    let mut kept: BTreeMap<usize, Match> = BTreeMap::new();
    for candidate in candidates {
        let before = kept.range(..=candidate.start).next_back();
        let after = kept.range(candidate.start..).next();
        let overlaps = before.is_some_and(|(_, k)| candidate.start < k.end)
            || after.is_some_and(|(_, k)| k.start < candidate.end);
        if !overlaps {
            kept.insert(candidate.start, candidate);
        }
    }
    kept.into_values().collect()
}

/// Compiled mention linker over a frozen registry snapshot.
pub struct MentionLinker {
    matcher: Box<dyn TextMatcher>,
}

impl MentionLinker {
    /// Compile every full name and alias of the registry.
    pub fn compile(registry: &Registry) -> Self {
        Self::with_matcher(AhoCorasickMatcher::new(registry.mention_names()))
    }

    pub fn with_matcher(matcher: impl TextMatcher + 'static) -> Self {
        Self {
            matcher: Box::new(matcher),
        }
    }

    pub fn matcher(&self) -> &dyn TextMatcher {
        self.matcher.as_ref()
    }

    /// Distinct entities mentioned by `text`, never including `source`.
    pub fn link(&self, source: &Identifier, text: &str) -> BTreeSet<Identifier> {
        self.matcher
            .find_matches(text)
            .into_iter()
            .map(|m| m.target)
            .filter(|target| target != source)
            .collect()
    }
}

impl std::fmt::Debug for MentionLinker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MentionLinker").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{AliasPolicy, RegistryBuilder};
    use proptest::prelude::*;

    fn id(name: &str) -> Identifier {
        Identifier::from_name(name)
    }

    fn registry(names: &[&str]) -> Registry {
        let mut builder = RegistryBuilder::new(AliasPolicy::default());
        for name in names {
            builder.register(name, "Boss");
        }
        builder.build()
    }

    /// Quadratic reference: every pattern tried at every offset.
    struct NaiveMatcher {
        patterns: Vec<(String, Identifier)>,
    }

    impl TextMatcher for NaiveMatcher {
        fn find_matches(&self, text: &str) -> Vec<Match> {
            let mut candidates = Vec::new();
            for (pattern, target) in &self.patterns {
                if pattern.is_empty() {
                    continue;
                }
                for start in 0..text.len() {
                    if text[start..].as_bytes().starts_with(pattern.as_bytes()) {
                        let end = start + pattern.len();
                        if is_whole_word(text, start, end) {
                            candidates.push(Match {
                                start,
                                end,
                                target: target.clone(),
                            });
                        }
                    }
                }
            }
            select_longest(candidates)
        }
    }

    #[test]
    fn test_longest_name_wins() {
        let reg = registry(&["Malenia, Blade of Miquella"]);
        let linker = MentionLinker::compile(&reg);
        let text = "Beware Malenia, Blade of Miquella in the Haligtree.";

        let matches = linker.matcher().find_matches(text);
        assert_eq!(matches.len(), 1);
        assert_eq!(&text[matches[0].start..matches[0].end], "Malenia, Blade of Miquella");

        let mentioned = linker.link(&id("Haligtree"), text);
        assert_eq!(mentioned, BTreeSet::from([id("Malenia, Blade of Miquella")]));
    }

    #[test]
    fn test_alias_alone_links_to_full_entity() {
        let reg = registry(&["Malenia, Blade of Miquella"]);
        let linker = MentionLinker::compile(&reg);
        let mentioned = linker.link(&id("Miquella"), "Malenia's scarlet rot.");
        assert_eq!(mentioned, BTreeSet::from([id("Malenia, Blade of Miquella")]));
    }

    #[test]
    fn test_whole_word_only() {
        let reg = registry(&["Rennala"]);
        let linker = MentionLinker::compile(&reg);
        assert!(linker.link(&id("X"), "Rennalas").is_empty());
        assert!(linker.link(&id("X"), "xRennala").is_empty());
        assert_eq!(linker.link(&id("X"), "(Rennala)").len(), 1);
    }

    #[test]
    fn test_no_self_mention() {
        let reg = registry(&["Godrick the Grafted", "Stormveil Castle"]);
        let linker = MentionLinker::compile(&reg);
        let mentioned = linker.link(
            &id("Godrick the Grafted"),
            "Godrick the Grafted rules Stormveil Castle.",
        );
        assert_eq!(mentioned, BTreeSet::from([id("Stormveil Castle")]));
    }

    #[test]
    fn test_dedup_by_target() {
        let reg = registry(&["Radahn"]);
        let linker = MentionLinker::compile(&reg);
        let text = "Radahn, and again Radahn.";
        assert_eq!(linker.matcher().find_matches(text).len(), 2);
        assert_eq!(linker.link(&id("X"), text).len(), 1);
    }

    #[test]
    fn test_case_sensitive() {
        let reg = registry(&["Radahn"]);
        let linker = MentionLinker::compile(&reg);
        assert!(linker.link(&id("X"), "radahn").is_empty());
    }

    #[test]
    fn test_overlap_prefers_leftmost_on_equal_length() {
        let candidates = vec![
            Match { start: 2, end: 6, target: id("B") },
            Match { start: 0, end: 4, target: id("A") },
        ];
        let kept = select_longest(candidates);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].target, id("A"));
    }

    #[test]
    fn test_selection_checks_both_neighbours() {
        let candidates = vec![
            Match { start: 0, end: 3, target: id("A") },
            Match { start: 10, end: 13, target: id("B") },
            Match { start: 2, end: 4, target: id("C") },
            Match { start: 9, end: 11, target: id("D") },
            Match { start: 5, end: 7, target: id("E") },
            Match { start: 4, end: 5, target: id("F") },
        ];
        let kept: Vec<Identifier> = select_longest(candidates).into_iter().map(|m| m.target).collect();
        assert_eq!(kept, vec![id("A"), id("F"), id("E"), id("B")]);
    }

    proptest! {
        #[test]
        fn test_matches_naive_reference(
            words in proptest::collection::vec(
                proptest::sample::select(vec![
                    "Malenia", "Malenia,", "Blade", "of", "Miquella", "Ranni", "the", "Witch", "x",
                ]),
                0..24,
            )
        ) {
            let names = ["Malenia, Blade of Miquella", "Ranni the Witch", "Ranni", "Blade", "the Witch"];
            let reg = registry(&names);
            let text = words.join(" ");

            let fast = AhoCorasickMatcher::new(reg.mention_names());
            let naive = NaiveMatcher {
                patterns: reg.mention_names().map(|(n, t)| (n.to_string(), t.clone())).collect(),
            };
            prop_assert_eq!(fast.find_matches(&text), naive.find_matches(&text));
        }
    }
}
