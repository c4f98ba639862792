//! Byte-level Aho-Corasick automaton.
//!
//! A trie over every pattern plus failure links. Scanning is one pass over
//! the haystack regardless of how many patterns were compiled in; each state
//! carries the indices of every pattern that ends there, including those
//! inherited through its failure chain.

use std::collections::{BTreeMap, VecDeque};

const ROOT: usize = 0;

#[derive(Debug, Clone, Default)]
struct State {
    next: BTreeMap<u8, usize>,
    fail: usize,
    /// Patterns ending at this state.
    outputs: Vec<usize>,
}

/// A raw, possibly overlapping hit: pattern index and byte span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Hit {
    pub pattern: usize,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone)]
pub struct Automaton {
    states: Vec<State>,
    lengths: Vec<usize>,
}

impl Automaton {
    /// Compile patterns; index `i` of the input is pattern `i` in hits.
    /// Empty patterns are kept in the numbering but never reported.
    pub fn new<I, P>(patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let mut automaton = Self {
            states: vec![State::default()],
            lengths: Vec::new(),
        };
        for pattern in patterns {
            automaton.insert(pattern.as_ref());
        }
        automaton.link_failures();
        automaton
    }

    fn insert(&mut self, pattern: &[u8]) {
        let index = self.lengths.len();
        self.lengths.push(pattern.len());
        if pattern.is_empty() {
            return;
        }

        let mut state = ROOT;
        for &byte in pattern {
            state = match self.states[state].next.get(&byte) {
                Some(&next) => next,
                None => {
                    let next = self.states.len();
                    self.states.push(State::default());
                    self.states[state].next.insert(byte, next);
                    next
                }
            };
        }
        self.states[state].outputs.push(index);
    }

    /// Breadth-first failure links; outputs of the failure target are merged
    /// into each state so a scan never has to walk the chain for matches.
    fn link_failures(&mut self) {
        let mut queue: VecDeque<usize> = VecDeque::new();
        let depth_one: Vec<usize> = self.states[ROOT].next.values().copied().collect();
        for state in depth_one {
            self.states[state].fail = ROOT;
            queue.push_back(state);
        }

        while let Some(state) = queue.pop_front() {
            let edges: Vec<(u8, usize)> = self.states[state]
                .next
                .iter()
                .map(|(&b, &s)| (b, s))
                .collect();

            for (byte, child) in edges {
                let mut fallback = self.states[state].fail;
                let fail = loop {
                    if let Some(&target) = self.states[fallback].next.get(&byte) {
                        break target;
                    }
                    if fallback == ROOT {
                        break ROOT;
                    }
                    fallback = self.states[fallback].fail;
                };

                self.states[child].fail = fail;
                let inherited = self.states[fail].outputs.clone();
                self.states[child].outputs.extend(inherited);
                queue.push_back(child);
            }
        }
    }

    fn step(&self, mut state: usize, byte: u8) -> usize {
        loop {
            if let Some(&next) = self.states[state].next.get(&byte) {
                return next;
            }
            if state == ROOT {
                return ROOT;
            }
            state = self.states[state].fail;
        }
    }

    /// Every occurrence of every pattern, overlapping ones included, ordered
    /// by end offset.
    pub fn find_overlapping(&self, haystack: &[u8]) -> Vec<Hit> {
        let mut hits = Vec::new();
        let mut state = ROOT;
        for (i, &byte) in haystack.iter().enumerate() {
            state = self.step(state, byte);
            for &pattern in &self.states[state].outputs {
                let end = i + 1;
                hits.push(Hit {
                    pattern,
                    start: end - self.lengths[pattern],
                    end,
                });
            }
        }
        hits
    }

    pub fn pattern_count(&self) -> usize {
        self.lengths.len()
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }
}
