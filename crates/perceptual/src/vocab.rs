//! Shingle vocabulary: stable integer ids for token n-grams.
//!
//! Ids are handed out in first-seen order starting at 0 and are never reused
//! or reassigned. Every signature in an index is computed against these ids,
//! so a restored vocabulary must map every shingle to exactly the id it had
//! when it was saved.

use hashbrown::HashMap;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::PerceptualError;

/// Interning table from shingles (token tuples) to dense ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShingleVocabulary {
    next_id: u64,
    ids: HashMap<Vec<String>, u64>,
}

impl ShingleVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id of `shingle`, assigning the next free id on first sight.
    pub fn intern(&mut self, shingle: &[String]) -> u64 {
        if let Some(&id) = self.ids.get(shingle) {
            return id;
        }
        let id = self.next_id;
        self.ids.insert(shingle.to_vec(), id);
        self.next_id += 1;
        id
    }

    /// Look up an id without assigning one.
    pub fn get(&self, shingle: &[String]) -> Option<u64> {
        self.ids.get(shingle).copied()
    }

    /// The id the next unseen shingle will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Check the dense-id invariant: ids are exactly `0..next_id`.
    pub fn validate(&self) -> Result<(), PerceptualError> {
        if self.next_id != self.ids.len() as u64 {
            return Err(PerceptualError::InconsistentVocabulary(format!(
                "next_id {} does not match {} interned shingles",
                self.next_id,
                self.ids.len()
            )));
        }
        let mut taken = vec![false; self.ids.len()];
        for &id in self.ids.values() {
            match taken.get_mut(id as usize) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(PerceptualError::InconsistentVocabulary(format!(
                        "id {id} is out of range or assigned twice"
                    )))
                }
            }
        }
        Ok(())
    }

    /// Shingles ordered by id.
    pub(crate) fn ordered(&self) -> Vec<&[String]> {
        let mut ordered: Vec<(&[String], u64)> = self
            .ids
            .iter()
            .map(|(shingle, &id)| (shingle.as_slice(), id))
            .collect();
        ordered.sort_unstable_by_key(|&(_, id)| id);
        ordered.into_iter().map(|(shingle, _)| shingle).collect()
    }
}

// Persisted as the shingle list in id order: position == id. This keeps the
// encoding independent of hash-map iteration order.
impl Serialize for ShingleVocabulary {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.ordered().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ShingleVocabulary {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let shingles = Vec::<Vec<String>>::deserialize(deserializer)?;
        let mut ids = HashMap::with_capacity(shingles.len());
        for (id, shingle) in shingles.into_iter().enumerate() {
            if ids.insert(shingle, id as u64).is_some() {
                return Err(DeError::custom(format!(
                    "shingle at id {id} appears more than once"
                )));
            }
        }
        Ok(Self {
            next_id: ids.len() as u64,
            ids,
        })
    }
}
