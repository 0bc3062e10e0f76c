//! Ordered element sequence for one template being edited.
//!
//! Invariant: after every mutation the `order` values are exactly
//! `0..len` in sequence order, with no gaps and no duplicates.

use serde::{Deserialize, Serialize};

use crate::elements::{ElementConfig, ElementType, ProposalElement};
use crate::error::CoreError;

/// Direction for [`ElementStore::move_element`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementStore {
    elements: Vec<ProposalElement>,
}

impl ElementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from persisted elements.
    ///
    /// The stored `order` field is authoritative, so elements are sorted by
    /// it (stable for ties) and then renumbered densely.
    pub fn from_elements(mut elements: Vec<ProposalElement>) -> Self {
        elements.sort_by_key(ProposalElement::order);
        let mut store = Self { elements };
        store.renumber_from(0);
        store
    }

    pub fn elements(&self) -> &[ProposalElement] {
        &self.elements
    }

    pub fn into_elements(self) -> Vec<ProposalElement> {
        self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ProposalElement> {
        self.elements.iter().find(|el| el.id() == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.elements.iter().position(|el| el.id() == id)
    }

    /// Append a new element of `element_type` with default config.
    /// Returns the new element's id.
    pub fn add_element(&mut self, element_type: ElementType) -> String {
        let element = ProposalElement::new(element_type, self.elements.len() as u32);
        let id = element.id().to_string();
        self.elements.push(element);
        id
    }

    /// Swap an element with its neighbour.
    ///
    /// Unknown ids and moves past either end leave the sequence untouched,
    /// so a stale UI reference can never corrupt it. Returns whether
    /// anything moved.
    pub fn move_element(&mut self, id: &str, direction: MoveDirection) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let target = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < self.elements.len() => index + 1,
            _ => return false,
        };

        self.elements.swap(index, target);
        self.renumber_from(index.min(target));
        true
    }

    /// Remove an element and close the gap in `order`. Returns whether an
    /// element was removed; the caller clears its selection if it was.
    pub fn delete_element(&mut self, id: &str) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.elements.remove(index);
        self.renumber_from(index);
        true
    }

    /// Replace an element's config wholesale (no merge).
    ///
    /// Unknown ids are a no-op (`Ok(false)`). A config for a different
    /// element type is rejected because the type tag is immutable.
    pub fn update_element_config(
        &mut self,
        id: &str,
        config: ElementConfig,
    ) -> Result<bool, CoreError> {
        match self.elements.iter_mut().find(|el| el.id() == id) {
            Some(element) => element.set_config(config).map(|()| true),
            None => Ok(false),
        }
    }

    /// Only elements at or after `start` can have a stale order value, so
    /// earlier elements are left alone.
    fn renumber_from(&mut self, start: usize) {
        for (idx, element) in self.elements.iter_mut().enumerate().skip(start) {
            element.set_order(idx as u32);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::elements::{HeroConfig, PricingTiersConfig};

    fn orders(store: &ElementStore) -> Vec<u32> {
        store.elements().iter().map(ProposalElement::order).collect()
    }

    fn ids(store: &ElementStore) -> Vec<String> {
        store.elements().iter().map(|el| el.id().to_string()).collect()
    }

    fn assert_dense(store: &ElementStore) {
        let expected: Vec<u32> = (0..store.len() as u32).collect();
        assert_eq!(orders(store), expected);
    }

    fn three() -> (ElementStore, String, String, String) {
        let mut store = ElementStore::new();
        let a = store.add_element(ElementType::Hero);
        let b = store.add_element(ElementType::NumberInput);
        let c = store.add_element(ElementType::PricingTiers);
        (store, a, b, c)
    }

    #[test]
    fn add_appends_with_next_order() {
        let (store, a, _, c) = three();
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(&a).unwrap().order(), 0);
        assert_eq!(store.get(&c).unwrap().order(), 2);
        assert_eq!(store.get(&c).unwrap().element_type(), ElementType::PricingTiers);
    }

    #[test]
    fn delete_renumbers_following_elements() {
        let (mut store, a, b, c) = three();
        assert!(store.delete_element(&b));
        assert_eq!(ids(&store), vec![a.clone(), c.clone()]);
        assert_eq!(store.get(&a).unwrap().order(), 0);
        assert_eq!(store.get(&c).unwrap().order(), 1);
    }

    #[test]
    fn delete_unknown_id_is_noop() {
        let (mut store, ..) = three();
        let before = store.clone();
        assert!(!store.delete_element("nope"));
        assert_eq!(store, before);
    }

    #[test]
    fn move_swaps_with_neighbour() {
        let (mut store, a, b, c) = three();
        assert!(store.move_element(&c, MoveDirection::Up));
        assert_eq!(ids(&store), vec![a.clone(), c.clone(), b.clone()]);
        assert_dense(&store);

        assert!(store.move_element(&a, MoveDirection::Down));
        assert_eq!(ids(&store), vec![c, a, b]);
        assert_dense(&store);
    }

    #[test]
    fn move_past_boundary_leaves_sequence_identical() {
        let (mut store, a, _, c) = three();
        let before = store.clone();
        assert!(!store.move_element(&a, MoveDirection::Up));
        assert!(!store.move_element(&c, MoveDirection::Down));
        assert_eq!(store, before);
    }

    #[test]
    fn move_unknown_id_is_silent_noop() {
        let (mut store, ..) = three();
        let before = store.clone();
        assert!(!store.move_element("stale-id", MoveDirection::Up));
        assert_eq!(store, before);
    }

    #[test]
    fn order_stays_dense_across_mixed_operations() {
        let mut store = ElementStore::new();
        let mut live = Vec::new();
        for (step, t) in ElementType::ALL.iter().cycle().take(40).enumerate() {
            live.push(store.add_element(*t));
            assert_dense(&store);
            if step % 3 == 0 {
                let id = live[step % live.len()].clone();
                store.move_element(&id, MoveDirection::Up);
                assert_dense(&store);
            }
            if step % 4 == 0 {
                let id = live.remove(live.len() / 2);
                assert!(store.delete_element(&id));
                assert_dense(&store);
            }
            if let (0, Some(id)) = (step % 5, live.first().cloned()) {
                store.move_element(&id, MoveDirection::Down);
                assert_dense(&store);
            }
        }
        assert_eq!(store.len(), live.len());
    }

    #[test]
    fn update_replaces_config_wholesale() {
        let (mut store, a, ..) = three();
        let hero = HeroConfig {
            title: "Wedding Film Package".into(),
            subtitle: String::new(),
            background_color: None,
            text_color: None,
            ..Default::default()
        };
        assert!(store
            .update_element_config(&a, ElementConfig::Hero(hero.clone()))
            .unwrap());
        assert_eq!(store.get(&a).unwrap().config(), &ElementConfig::Hero(hero));
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let (mut store, ..) = three();
        let before = store.clone();
        let changed = store
            .update_element_config("missing", ElementConfig::Hero(HeroConfig::default()))
            .unwrap();
        assert!(!changed);
        assert_eq!(store, before);
    }

    #[test]
    fn update_with_wrong_variant_is_rejected() {
        let (mut store, a, ..) = three();
        let result =
            store.update_element_config(&a, ElementConfig::PricingTiers(PricingTiersConfig::default()));
        assert_matches!(result, Err(CoreError::Validation(_)));
    }

    #[test]
    fn from_elements_sorts_by_order_field() {
        let (store, a, b, c) = three();
        let mut elements = store.into_elements();
        elements.reverse();
        let restored = ElementStore::from_elements(elements);
        assert_eq!(ids(&restored), vec![a, b, c]);
        assert_dense(&restored);
    }
}
