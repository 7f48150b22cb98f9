use crate::workout::Set;

/// A run of same-named working sets, possibly separated by rests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetSequence {
    pub start_index: usize,
    pub end_index: usize,
    pub name: String,
    /// Matching non-rest indices, ascending
    pub indices: Vec<usize>,
}

impl SetSequence {
    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    /// 1-based position of `index` within the run
    pub fn position_of(&self, index: usize) -> Option<usize> {
        self.indices.iter().position(|&i| i == index).map(|p| p + 1)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Find the superset that `index` belongs to.
///
/// Rests are skipped in both directions without breaking the scan; the first
/// working set with a different name ends it. A single matching set is not a
/// sequence.
pub fn find_sequence(sets: &[Set], index: usize) -> Option<SetSequence> {
    let name = sets.get(index)?.name()?;

    let mut start_index = index;
    for (i, set) in sets[..index].iter().enumerate().rev() {
        match set.name() {
            None => continue,
            Some(n) if n == name => start_index = i,
            Some(_) => break,
        }
    }

    let mut end_index = index;
    for (i, set) in sets.iter().enumerate().skip(index + 1) {
        match set.name() {
            None => continue,
            Some(n) if n == name => end_index = i,
            Some(_) => break,
        }
    }

    let indices: Vec<usize> = (start_index..=end_index)
        .filter(|&i| sets[i].name() == Some(name))
        .collect();

    if indices.len() <= 1 {
        return None;
    }

    Some(SetSequence {
        start_index,
        end_index,
        name: name.to_string(),
        indices,
    })
}
