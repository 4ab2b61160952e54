/// Constrained random selection — the heart of the generator.
///
/// Picks base categories and category-constrained words uniformly at
/// random among the candidates a session has not yet used. Exhaustion is
/// detected with an exact set difference rather than the resampling
/// heuristic the original bot used, which could loop longer than
/// necessary and mis-trigger.
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::core::store::{StoreError, TaxonomyStore};
use crate::schema::session::Session;
use crate::schema::taxonomy::CategoryKey;

#[derive(Debug, Error)]
pub enum SelectError {
    /// The taxonomy defines no base categories at all.
    #[error("no base categories are defined in the taxonomy")]
    NoBaseCategories,
    /// The taxonomy has no word satisfying the requested key. Retrying
    /// cannot help: the taxonomy is static for the run.
    #[error("no words satisfy category key '{0}'")]
    NoCandidates(CategoryKey),
    /// Valid base categories exist, but this session has used them all.
    #[error("every base category has already been used this session")]
    BaseCategoriesExhausted,
    /// Valid words exist for the key, but this session has used them all.
    #[error("every word for category key '{0}' has already been used this session")]
    WordsExhausted(CategoryKey),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Stateless selection engine over a read-only taxonomy store.
///
/// All per-run state lives in the `Session` the caller threads through
/// each call; the selector itself holds nothing but a store reference.
pub struct Selector<'a, S: TaxonomyStore> {
    store: &'a S,
}

impl<'a, S: TaxonomyStore> Selector<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Pick a base category the session has not used yet, uniformly at
    /// random, and record it in the session.
    ///
    /// Errors leave the session untouched: `NoBaseCategories` when the
    /// store has none, `BaseCategoriesExhausted` when all have been used.
    pub fn pick_base_category(
        &self,
        session: &mut Session,
        rng: &mut StdRng,
    ) -> Result<String, SelectError> {
        let all = self.store.base_categories()?;
        if all.is_empty() {
            return Err(SelectError::NoBaseCategories);
        }

        let remaining: Vec<String> = all
            .into_iter()
            .filter(|c| !session.category_used(&c.name))
            .map(|c| c.name)
            .collect();

        let chosen = remaining
            .choose(rng)
            .ok_or(SelectError::BaseCategoriesExhausted)?
            .clone();
        log::debug!("picked base category '{}'", chosen);
        session.mark_category(chosen.clone());
        Ok(chosen)
    }

    /// Pick a word belonging to every category in `key` and none in
    /// `exclude`, unused for this exact key in this session, uniformly at
    /// random; record it under `key`.
    ///
    /// `NoCandidates` (the taxonomy has no such word) and
    /// `WordsExhausted` (it does, but the session drained them) are
    /// distinct conditions; both leave the session untouched.
    pub fn pick_word(
        &self,
        key: &CategoryKey,
        exclude: Option<&CategoryKey>,
        session: &mut Session,
        rng: &mut StdRng,
    ) -> Result<String, SelectError> {
        let candidates = self.store.find_words(key, exclude)?;
        if candidates.is_empty() {
            return Err(SelectError::NoCandidates(key.clone()));
        }

        let used = session.words_used_for(key);
        let remaining: Vec<String> = candidates
            .into_iter()
            .filter(|w| used.map_or(true, |u| !u.contains(w)))
            .collect();

        let chosen = remaining
            .choose(rng)
            .ok_or_else(|| SelectError::WordsExhausted(key.clone()))?
            .clone();
        log::debug!("picked word '{}' for key '{}'", chosen, key);
        session.mark_word(key.clone(), chosen.clone());
        Ok(chosen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::store::MemoryStore;
    use crate::schema::taxonomy::Category;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    /// Store from the spec scenario: A and B base, w1 in A, w2 in both,
    /// w3 in B.
    fn scenario_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert_category(Category::new("A", true));
        store.insert_category(Category::new("B", true));
        for w in ["w1", "w2", "w3"] {
            store.insert_word(w);
        }
        store.insert_membership("A", "w1").unwrap();
        store.insert_membership("A", "w2").unwrap();
        store.insert_membership("B", "w2").unwrap();
        store.insert_membership("B", "w3").unwrap();
        store
    }

    #[test]
    fn base_category_never_repeats() {
        let store = scenario_store();
        let selector = Selector::new(&store);
        let mut session = Session::new();
        let mut rng = rng();

        let first = selector.pick_base_category(&mut session, &mut rng).unwrap();
        let second = selector.pick_base_category(&mut session, &mut rng).unwrap();
        assert_ne!(first, second);

        let mut picked = vec![first, second];
        picked.sort();
        assert_eq!(picked, vec!["A", "B"]);
    }

    #[test]
    fn base_categories_exhaust() {
        let store = scenario_store();
        let selector = Selector::new(&store);
        let mut session = Session::new();
        let mut rng = rng();

        selector.pick_base_category(&mut session, &mut rng).unwrap();
        selector.pick_base_category(&mut session, &mut rng).unwrap();
        let err = selector
            .pick_base_category(&mut session, &mut rng)
            .unwrap_err();
        assert!(matches!(err, SelectError::BaseCategoriesExhausted));
    }

    #[test]
    fn single_base_category_exhausts_on_second_pick() {
        let mut store = MemoryStore::new();
        store.insert_category(Category::new("only", true));
        let selector = Selector::new(&store);
        let mut session = Session::new();
        let mut rng = rng();

        assert_eq!(
            selector.pick_base_category(&mut session, &mut rng).unwrap(),
            "only"
        );
        let err = selector
            .pick_base_category(&mut session, &mut rng)
            .unwrap_err();
        assert!(matches!(err, SelectError::BaseCategoriesExhausted));
    }

    #[test]
    fn no_base_categories_at_all() {
        let store = MemoryStore::new();
        let selector = Selector::new(&store);
        let mut session = Session::new();
        let err = selector
            .pick_base_category(&mut session, &mut rng())
            .unwrap_err();
        assert!(matches!(err, SelectError::NoBaseCategories));
    }

    #[test]
    fn word_satisfies_key() {
        let store = scenario_store();
        let selector = Selector::new(&store);
        let mut session = Session::new();
        let mut rng = rng();

        let key = CategoryKey::single("A");
        let word = selector
            .pick_word(&key, None, &mut session, &mut rng)
            .unwrap();
        assert!(word == "w1" || word == "w2");
    }

    #[test]
    fn word_honors_exclusion() {
        let store = scenario_store();
        let selector = Selector::new(&store);
        let mut session = Session::new();
        let mut rng = rng();

        let key = CategoryKey::single("A");
        let exclude = CategoryKey::single("B");
        // w2 is in both A and B, so only w1 qualifies.
        let word = selector
            .pick_word(&key, Some(&exclude), &mut session, &mut rng)
            .unwrap();
        assert_eq!(word, "w1");
    }

    #[test]
    fn word_drain_then_exhaust() {
        let store = scenario_store();
        let selector = Selector::new(&store);
        let mut session = Session::new();
        let mut rng = rng();

        let key = CategoryKey::single("A");
        let first = selector
            .pick_word(&key, None, &mut session, &mut rng)
            .unwrap();
        let second = selector
            .pick_word(&key, None, &mut session, &mut rng)
            .unwrap();
        assert_ne!(first, second);

        let mut drained = vec![first, second];
        drained.sort();
        assert_eq!(drained, vec!["w1", "w2"]);

        // Candidates exist but all are used: exhausted, not no-candidates.
        let err = selector
            .pick_word(&key, None, &mut session, &mut rng)
            .unwrap_err();
        assert!(matches!(err, SelectError::WordsExhausted(k) if k == key));
    }

    #[test]
    fn no_candidates_leaves_session_untouched() {
        let store = scenario_store();
        let selector = Selector::new(&store);
        let mut session = Session::new();
        let mut rng = rng();

        let key = CategoryKey::new(["A", "no_such_category"]);
        let err = selector
            .pick_word(&key, None, &mut session, &mut rng)
            .unwrap_err();
        assert!(matches!(err, SelectError::NoCandidates(k) if k == key));
        assert!(session.words_used_for(&key).is_none());
    }

    #[test]
    fn compound_key_requires_all_categories() {
        let store = scenario_store();
        let selector = Selector::new(&store);
        let mut session = Session::new();
        let mut rng = rng();

        let key = CategoryKey::new(["A", "B"]);
        // Only w2 is in both.
        let word = selector
            .pick_word(&key, None, &mut session, &mut rng)
            .unwrap();
        assert_eq!(word, "w2");
    }

    #[test]
    fn used_tracking_is_per_key() {
        let store = scenario_store();
        let selector = Selector::new(&store);
        let mut session = Session::new();
        let mut rng = rng();

        let compound = CategoryKey::new(["A", "B"]);
        let w2 = selector
            .pick_word(&compound, None, &mut session, &mut rng)
            .unwrap();
        assert_eq!(w2, "w2");

        // w2 was used under {A,B}, not under {A}: it may still come back
        // for the plain key.
        let plain = CategoryKey::single("A");
        let mut seen_w2 = false;
        for seed in 0..32 {
            let mut fresh = session.clone();
            let mut r = StdRng::seed_from_u64(seed);
            if selector
                .pick_word(&plain, None, &mut fresh, &mut r)
                .unwrap()
                == "w2"
            {
                seen_w2 = true;
                break;
            }
        }
        assert!(seen_w2);
    }

    #[test]
    fn reversed_key_shares_used_words() {
        let store = scenario_store();
        let selector = Selector::new(&store);
        let mut session = Session::new();
        let mut rng = rng();

        let forward = CategoryKey::new(["A", "B"]);
        selector
            .pick_word(&forward, None, &mut session, &mut rng)
            .unwrap();

        let reversed = CategoryKey::new(["B", "A"]);
        let err = selector
            .pick_word(&reversed, None, &mut session, &mut rng)
            .unwrap_err();
        assert!(matches!(err, SelectError::WordsExhausted(_)));
    }
}
