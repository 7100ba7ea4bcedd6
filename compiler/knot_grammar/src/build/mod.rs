//! Table construction.
//!
//! Each rule becomes an NFA (one start and one end state, epsilon arcs for
//! grouping and repetition), then a DFA by subset construction. Equivalent
//! DFA states are merged, first sets are computed, and every state gets an
//! accelerator mapping terminal labels straight to a shift or a push. Two
//! arcs of one state competing for a terminal make the grammar ambiguous.

use std::collections::BTreeMap;

use knot_ir::Symbol;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::grammar::{Action, Arc, Dfa, Grammar, State};
use crate::label::{Label, LabelId, LabelTable};
use crate::meta::{self, Rhs};
use crate::GrammarError;

impl Grammar {
    /// Build LL(1) tables from grammar text.
    pub fn from_text(text: &str) -> Result<Self, GrammarError> {
        let rules = meta::parse_rules(text)?;
        let mut labels = LabelTable::default();
        let mut raw: FxHashMap<Symbol, Vec<RawState>> = FxHashMap::default();
        let mut order = Vec::with_capacity(rules.len());

        for rule in &rules {
            let symbol = Symbol::from_name(&rule.name)
                .ok_or_else(|| GrammarError::UnknownName(rule.name.clone()))?;
            if raw.contains_key(&symbol) {
                return Err(GrammarError::DuplicateRule(rule.name.clone()));
            }
            let mut nfa = Nfa::default();
            let (start, end) = nfa.add(&rule.rhs, &mut labels)?;
            let mut states = nfa.to_dfa(start, end);
            simplify(&mut states);
            if u16::try_from(states.len()).is_err() {
                return Err(GrammarError::TooManyStates(rule.name.clone()));
            }
            raw.insert(symbol, states);
            order.push(symbol);
        }

        let labels = labels.into_vec();
        for label in &labels {
            if let Label::Rule(sym) = label {
                if !raw.contains_key(sym) {
                    return Err(GrammarError::MissingRule(sym.name().to_owned()));
                }
            }
        }

        let mut firsts = FirstSets::default();
        for &symbol in &order {
            firsts.compute(symbol, &raw, &labels)?;
        }

        let mut dfas: Vec<Option<Dfa>> = vec![None; Symbol::ALL.len()];
        for &symbol in &order {
            let Some(states) = raw.get(&symbol) else {
                continue;
            };
            let dfa = accelerate(symbol, states, &firsts, &labels)?;
            debug!(rule = %symbol, states = dfa.states.len(), "built dfa");
            dfas[symbol as usize] = Some(dfa);
        }

        let mut keywords = FxHashMap::default();
        let mut tokens = FxHashMap::default();
        for (index, label) in labels.iter().enumerate() {
            let Ok(id) = u16::try_from(index) else {
                continue;
            };
            let id = LabelId::from_raw(id);
            match label {
                Label::Keyword(text) => {
                    keywords.insert(text.clone(), id);
                }
                Label::Token(kind) => {
                    tokens.insert(*kind, id);
                }
                Label::Rule(_) => {}
            }
        }

        Ok(Grammar {
            labels,
            keywords,
            tokens,
            dfas,
        })
    }
}

#[derive(Default)]
struct Nfa {
    arcs: Vec<Vec<(Option<LabelId>, usize)>>,
}

impl Nfa {
    fn state(&mut self) -> usize {
        self.arcs.push(Vec::new());
        self.arcs.len() - 1
    }

    fn arc(&mut self, from: usize, label: Option<LabelId>, to: usize) {
        self.arcs[from].push((label, to));
    }

    /// Add the states for `rhs`; returns its start and end.
    fn add(&mut self, rhs: &Rhs, labels: &mut LabelTable) -> Result<(usize, usize), GrammarError> {
        match rhs {
            Rhs::Alt(alts) => {
                let (start, end) = (self.state(), self.state());
                for alt in alts {
                    let (a, z) = self.add(alt, labels)?;
                    self.arc(start, None, a);
                    self.arc(z, None, end);
                }
                Ok((start, end))
            }
            Rhs::Seq(items) => {
                let start = self.state();
                let mut end = start;
                for item in items {
                    let (a, z) = self.add(item, labels)?;
                    self.arc(end, None, a);
                    end = z;
                }
                Ok((start, end))
            }
            Rhs::Opt(inner) => {
                let (a, z) = self.add(inner, labels)?;
                self.arc(a, None, z);
                Ok((a, z))
            }
            Rhs::Plus(inner) => {
                let (a, z) = self.add(inner, labels)?;
                self.arc(z, None, a);
                Ok((a, z))
            }
            Rhs::Star(inner) => {
                let (a, z) = self.add(inner, labels)?;
                self.arc(z, None, a);
                Ok((a, a))
            }
            Rhs::Name(name) => {
                let label = labels.resolve(name, false)?;
                Ok(self.atom(label))
            }
            Rhs::Literal(text) => {
                let label = labels.resolve(text, true)?;
                Ok(self.atom(label))
            }
        }
    }

    fn atom(&mut self, label: LabelId) -> (usize, usize) {
        let (a, z) = (self.state(), self.state());
        self.arc(a, Some(label), z);
        (a, z)
    }

    /// Sorted epsilon closure of `seeds`.
    fn closure(&self, seeds: impl IntoIterator<Item = usize>) -> Vec<usize> {
        let mut seen = vec![false; self.arcs.len()];
        let mut work: Vec<usize> = seeds.into_iter().collect();
        while let Some(state) = work.pop() {
            if std::mem::replace(&mut seen[state], true) {
                continue;
            }
            for &(label, next) in &self.arcs[state] {
                if label.is_none() && !seen[next] {
                    work.push(next);
                }
            }
        }
        seen.iter()
            .enumerate()
            .filter_map(|(state, &hit)| hit.then_some(state))
            .collect()
    }

    fn to_dfa(&self, start: usize, end: usize) -> Vec<RawState> {
        let first = self.closure([start]);
        let mut index: FxHashMap<Vec<usize>, usize> = FxHashMap::default();
        index.insert(first.clone(), 0);
        let mut states = vec![RawState::new(first, end)];

        let mut current = 0;
        while current < states.len() {
            let mut moves: BTreeMap<LabelId, Vec<usize>> = BTreeMap::new();
            for &nfa_state in &states[current].nfa {
                for &(label, next) in &self.arcs[nfa_state] {
                    if let Some(label) = label {
                        moves.entry(label).or_default().push(next);
                    }
                }
            }
            for (label, targets) in moves {
                let set = self.closure(targets);
                let target = match index.get(&set) {
                    Some(&target) => target,
                    None => {
                        let target = states.len();
                        index.insert(set.clone(), target);
                        states.push(RawState::new(set, end));
                        target
                    }
                };
                states[current].arcs.insert(label, target);
            }
            current += 1;
        }
        states
    }
}

/// DFA state before acceleration.
#[derive(Clone, Debug)]
struct RawState {
    nfa: Vec<usize>,
    arcs: BTreeMap<LabelId, usize>,
    accepting: bool,
}

impl RawState {
    fn new(nfa: Vec<usize>, end: usize) -> Self {
        let accepting = nfa.binary_search(&end).is_ok();
        RawState {
            nfa,
            arcs: BTreeMap::new(),
            accepting,
        }
    }
}

/// Merge states with the same acceptance and the same arcs until none
/// remain.
fn simplify(states: &mut Vec<RawState>) {
    'restart: loop {
        for i in 0..states.len() {
            for j in i + 1..states.len() {
                if states[i].accepting == states[j].accepting && states[i].arcs == states[j].arcs {
                    states.remove(j);
                    for state in states.iter_mut() {
                        for target in state.arcs.values_mut() {
                            if *target == j {
                                *target = i;
                            } else if *target > j {
                                *target -= 1;
                            }
                        }
                    }
                    continue 'restart;
                }
            }
        }
        return;
    }
}

#[derive(Default)]
struct FirstSets {
    /// `None` while a rule's set is being computed.
    sets: FxHashMap<Symbol, Option<Vec<LabelId>>>,
}

impl FirstSets {
    fn get(&self, symbol: Symbol) -> &[LabelId] {
        self.sets
            .get(&symbol)
            .and_then(Option::as_deref)
            .unwrap_or_default()
    }

    fn compute(
        &mut self,
        symbol: Symbol,
        raw: &FxHashMap<Symbol, Vec<RawState>>,
        labels: &[Label],
    ) -> Result<(), GrammarError> {
        match self.sets.get(&symbol) {
            Some(Some(_)) => return Ok(()),
            Some(None) => return Err(GrammarError::LeftRecursive(symbol.name().to_owned())),
            None => {}
        }
        self.sets.insert(symbol, None);

        let mut first = Vec::new();
        let start = raw.get(&symbol).and_then(|states| states.first());
        for &label in start.map(|s| s.arcs.keys()).into_iter().flatten() {
            match labels.get(label.index()) {
                Some(Label::Rule(sub)) => {
                    self.compute(*sub, raw, labels)?;
                    first.extend_from_slice(self.get(*sub));
                }
                Some(_) => first.push(label),
                None => {}
            }
        }
        first.sort_unstable();
        first.dedup();
        self.sets.insert(symbol, Some(first));
        Ok(())
    }
}

fn accelerate(
    symbol: Symbol,
    states: &[RawState],
    firsts: &FirstSets,
    labels: &[Label],
) -> Result<Dfa, GrammarError> {
    let ambiguous = |label: LabelId| GrammarError::Ambiguous {
        rule: symbol.name().to_owned(),
        label: labels
            .get(label.index())
            .map(ToString::to_string)
            .unwrap_or_default(),
    };
    let mut out = Vec::with_capacity(states.len());
    for state in states {
        let mut arcs = SmallVec::new();
        let mut accel = FxHashMap::default();
        for (&label, &target) in &state.arcs {
            let next = u16::try_from(target)
                .map_err(|_| GrammarError::TooManyStates(symbol.name().to_owned()))?;
            arcs.push(Arc { label, next });
            match labels.get(label.index()) {
                Some(Label::Rule(sub)) => {
                    for &terminal in firsts.get(*sub) {
                        let action = Action::Push { symbol: *sub, next };
                        if accel.insert(terminal, action).is_some() {
                            return Err(ambiguous(terminal));
                        }
                    }
                }
                Some(_) => {
                    if accel.insert(label, Action::Shift(next)).is_some() {
                        return Err(ambiguous(label));
                    }
                }
                None => {}
            }
        }
        out.push(State {
            arcs,
            accepting: state.accepting,
            accel,
        });
    }
    Ok(Dfa {
        symbol,
        states: out,
        first: firsts.get(symbol).to_vec(),
    })
}
