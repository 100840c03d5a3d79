//! Product modal state machine: `Closed` or `Open(selection)`.

use std::fmt;

use shared::{
    domain::{CatalogEntry, ProductId},
    format::display_price,
    protocol::AddToCartRequest,
};

use crate::quantity::Quantity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    CloseControl,
    Backdrop,
    Escape,
    Submitted,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CloseControl => "close_control",
            Self::Backdrop => "backdrop",
            Self::Escape => "escape",
            Self::Submitted => "submitted",
        };
        f.write_str(name)
    }
}

/// Identifies one `Open` period. Reopening, even on the same product, yields a new ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSelection {
    product_id: Option<ProductId>,
    display_name: String,
    description: String,
    image_ref: String,
    unit_price: u64,
    quantity: Quantity,
    needs_cutlery: bool,
}

impl ProductSelection {
    fn from_entry(entry: &CatalogEntry) -> Self {
        Self {
            product_id: ProductId::parse(entry.id.as_str()),
            display_name: entry.name.clone(),
            description: entry.description.clone(),
            image_ref: entry.image.clone(),
            unit_price: entry.price,
            quantity: Quantity::default(),
            needs_cutlery: false,
        }
    }

    pub fn product_id(&self) -> Option<&ProductId> {
        self.product_id.as_ref()
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn image_ref(&self) -> &str {
        &self.image_ref
    }

    pub fn image_alt(&self) -> &str {
        &self.display_name
    }

    pub fn unit_price(&self) -> u64 {
        self.unit_price
    }

    pub fn price_label(&self) -> String {
        display_price(self.unit_price)
    }

    pub fn quantity(&self) -> u32 {
        self.quantity.get()
    }

    pub fn needs_cutlery(&self) -> bool {
        self.needs_cutlery
    }

    pub fn increment_quantity(&mut self) -> u32 {
        self.quantity.increment();
        self.quantity.get()
    }

    pub fn decrement_quantity(&mut self) -> u32 {
        self.quantity.decrement();
        self.quantity.get()
    }

    pub fn set_quantity_raw(&mut self, raw: &str) -> String {
        self.quantity.set_raw(raw)
    }

    pub fn set_needs_cutlery(&mut self, needs_cutlery: bool) {
        self.needs_cutlery = needs_cutlery;
    }

    pub fn toggle_cutlery(&mut self) -> bool {
        self.needs_cutlery = !self.needs_cutlery;
        self.needs_cutlery
    }

    /// `None` when the card carried no usable identifier.
    pub fn to_request(&self) -> Option<AddToCartRequest> {
        let product_id = self.product_id.clone()?;
        Some(AddToCartRequest {
            product_id,
            quantity: self.quantity.get(),
            needs_cutlery: self.needs_cutlery,
        })
    }
}

#[derive(Debug, Default)]
pub struct SelectionState {
    open: Option<(SelectionTicket, ProductSelection)>,
    opened_total: u64,
}

impl SelectionState {
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Loads a fresh selection from the entry. Nothing carries over from a previous one.
    pub fn open(&mut self, entry: &CatalogEntry) -> SelectionTicket {
        self.opened_total += 1;
        let ticket = SelectionTicket(self.opened_total);
        self.open = Some((ticket, ProductSelection::from_entry(entry)));
        ticket
    }

    /// Returns whether a transition happened; closing a closed modal is a no-op.
    pub fn close(&mut self) -> bool {
        self.open.take().is_some()
    }

    /// Closes only if the open period identified by `ticket` is still current.
    pub fn close_ticket(&mut self, ticket: SelectionTicket) -> bool {
        match &self.open {
            Some((current, _)) if *current == ticket => self.close(),
            _ => false,
        }
    }

    pub fn current(&self) -> Option<&ProductSelection> {
        self.open.as_ref().map(|(_, selection)| selection)
    }

    /// Controls only reach a selection through here, so they are inert while closed.
    pub fn current_mut(&mut self) -> Option<&mut ProductSelection> {
        self.open.as_mut().map(|(_, selection)| selection)
    }

    pub fn snapshot(&self) -> Option<(SelectionTicket, ProductSelection)> {
        self.open.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, price: u64) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            name: format!("Producto {id}"),
            description: "Con queso".to_string(),
            image: format!("/media/{id}.jpg"),
            price,
        }
    }

    #[test]
    fn opening_loads_entry_and_defaults() {
        let mut state = SelectionState::default();
        state.open(&entry("5", 14000));
        let selection = state.current().expect("open");
        assert_eq!(selection.product_id().map(ProductId::as_str), Some("5"));
        assert_eq!(selection.display_name(), "Producto 5");
        assert_eq!(selection.image_alt(), "Producto 5");
        assert_eq!(selection.price_label(), "$14.000");
        assert_eq!(selection.quantity(), 1);
        assert!(!selection.needs_cutlery());
    }

    #[test]
    fn reopening_never_leaks_previous_options() {
        let mut state = SelectionState::default();
        state.open(&entry("1", 1000));
        {
            let selection = state.current_mut().expect("open");
            selection.set_quantity_raw("40");
            selection.set_needs_cutlery(true);
        }

        state.open(&entry("2", 2000));
        let selection = state.current().expect("open");
        assert_eq!(selection.quantity(), 1);
        assert!(!selection.needs_cutlery());

        state.close();
        state.open(&entry("1", 1000));
        let selection = state.current().expect("open");
        assert_eq!(selection.quantity(), 1);
        assert!(!selection.needs_cutlery());
    }

    #[test]
    fn close_is_idempotent() {
        let mut state = SelectionState::default();
        assert!(!state.close());
        state.open(&entry("1", 0));
        assert!(state.close());
        assert!(!state.close());
        assert!(state.current_mut().is_none());
    }

    #[test]
    fn stale_ticket_does_not_close_newer_selection() {
        let mut state = SelectionState::default();
        let first = state.open(&entry("1", 0));
        let second = state.open(&entry("2", 0));
        assert!(!state.close_ticket(first));
        assert!(state.is_open());
        assert!(state.close_ticket(second));
        assert!(!state.is_open());
    }

    #[test]
    fn missing_identifier_builds_no_request() {
        let mut state = SelectionState::default();
        state.open(&entry("", 500));
        assert!(state.current().expect("open").to_request().is_none());
    }

    #[test]
    fn request_mirrors_selection() {
        let mut state = SelectionState::default();
        state.open(&entry("9", 500));
        let selection = state.current_mut().expect("open");
        selection.increment_quantity();
        selection.increment_quantity();
        selection.toggle_cutlery();
        let request = selection.to_request().expect("request");
        assert_eq!(request.product_id.as_str(), "9");
        assert_eq!(request.quantity, 3);
        assert!(request.needs_cutlery);
    }
}
