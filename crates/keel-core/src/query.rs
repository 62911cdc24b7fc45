use crate::{entity::Entity, predicate::Predicate};

/// Page size applied when a page index is given without an explicit size.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

///
/// OrderDirection
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OrderDirection {
    Asc,
    Desc,
}

///
/// OrderSpec
/// Composable ordering chain; fields are resolved by the source.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OrderSpec {
    pub fields: Vec<(String, OrderDirection)>,
}

///
/// IncludeSpec
///
/// Declares related data to fetch alongside the primary entity in one
/// query. The paths are interpreted by the external source; an in-memory
/// source materializes whole entities and treats them as satisfied.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IncludeSpec {
    pub paths: Vec<String>,
}

impl IncludeSpec {
    #[must_use]
    pub const fn new() -> Self {
        Self { paths: Vec::new() }
    }

    #[must_use]
    pub fn with(mut self, path: impl Into<String>) -> Self {
        self.paths.push(path.into());
        self
    }
}

///
/// Query
///
/// The full composed read specification handed to a source: filter,
/// ordering, includes, paging, tracking. Constructed per call, never
/// mutated after it leaves the builder. Sources MUST apply ordering before
/// paging; skip/take over an unordered extent is non-deterministic.
///

#[derive(Clone, Debug)]
pub struct Query<E: Entity> {
    predicate: Option<Predicate<E>>,
    order: Option<OrderSpec>,
    include: Option<IncludeSpec>,
    page_index: Option<u32>,
    page_size: Option<u32>,
    track: bool,
}

impl<E: Entity> Query<E> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            predicate: None,
            order: None,
            include: None,
            page_index: None,
            page_size: None,
            track: false,
        }
    }

    /// Add a predicate, implicitly AND-ing with any existing predicate.
    #[must_use]
    pub fn filter(mut self, predicate: Predicate<E>) -> Self {
        self.predicate = Some(match self.predicate.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    /// Append an ascending sort key.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order = Some(push_order(
            self.order.take(),
            field.into(),
            OrderDirection::Asc,
        ));
        self
    }

    /// Append a descending sort key.
    #[must_use]
    pub fn order_by_desc(mut self, field: impl Into<String>) -> Self {
        self.order = Some(push_order(
            self.order.take(),
            field.into(),
            OrderDirection::Desc,
        ));
        self
    }

    /// Attach an eager-load spec.
    #[must_use]
    pub fn include(mut self, include: IncludeSpec) -> Self {
        self.include = Some(include);
        self
    }

    /// Select a 1-based page of the ordered result.
    #[must_use]
    pub const fn page_index(mut self, index: u32) -> Self {
        self.page_index = Some(index);
        self
    }

    #[must_use]
    pub const fn page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Ask the source to keep change tracking on for the fetched rows.
    #[must_use]
    pub const fn track(mut self) -> Self {
        self.track = true;
        self
    }

    // --- accessors used by sources ---

    #[must_use]
    pub const fn predicate(&self) -> Option<&Predicate<E>> {
        self.predicate.as_ref()
    }

    #[must_use]
    pub const fn order(&self) -> Option<&OrderSpec> {
        self.order.as_ref()
    }

    #[must_use]
    pub const fn includes(&self) -> Option<&IncludeSpec> {
        self.include.as_ref()
    }

    #[must_use]
    pub const fn is_tracked(&self) -> bool {
        self.track
    }

    /// Rows to skip: `(page_index - 1) * (page_size or default)`. Absent
    /// page index means no skip even when a size is set.
    #[must_use]
    pub fn skip(&self) -> Option<u64> {
        self.page_index.map(|index| {
            u64::from(index.saturating_sub(1))
                * u64::from(self.page_size.unwrap_or(DEFAULT_PAGE_SIZE))
        })
    }

    /// Rows to take: the page size when one was given.
    #[must_use]
    pub fn take(&self) -> Option<u64> {
        self.page_size.map(u64::from)
    }
}

impl<E: Entity> Default for Query<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Append an ordering field, preserving any existing chain.
fn push_order(order: Option<OrderSpec>, field: String, direction: OrderDirection) -> OrderSpec {
    match order {
        Some(mut spec) => {
            spec.fields.push((field, direction));
            spec
        }
        None => OrderSpec {
            fields: vec![(field, direction)],
        },
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{FieldDef, FieldRegistry};
    use crate::predicate::Operator;
    use crate::value::{Value, ValueKind};

    #[derive(Clone, Debug)]
    struct Row {
        id: i64,
    }

    impl Entity for Row {
        type Key = i64;

        const NAME: &'static str = "row";
        const PRIMARY_KEY: &'static str = "id";
        const FIELDS: FieldRegistry<Self> = FieldRegistry::new(
            &[FieldDef {
                name: "id",
                kind: ValueKind::Int,
                get: |e: &Row| Value::Int(e.id),
            }],
            &[],
        );

        fn key(&self) -> i64 {
            self.id
        }
    }

    #[test]
    fn paging_math_uses_the_default_size() {
        let q = Query::<Row>::new().page_index(3);
        assert_eq!(q.skip(), Some(20));
        assert_eq!(q.take(), None);

        let q = Query::<Row>::new().page_index(2).page_size(25);
        assert_eq!(q.skip(), Some(25));
        assert_eq!(q.take(), Some(25));

        // size without index takes from the start
        let q = Query::<Row>::new().page_size(5);
        assert_eq!(q.skip(), None);
        assert_eq!(q.take(), Some(5));
    }

    #[test]
    fn filters_merge_with_and() {
        let q = Query::<Row>::new()
            .filter(Predicate::build("id", Operator::Gt, 1i64).unwrap())
            .filter(Predicate::build("id", Operator::Lt, 5i64).unwrap());

        let p = q.predicate().expect("predicate present");
        assert!(p.matches(&Row { id: 3 }));
        assert!(!p.matches(&Row { id: 5 }));
    }

    #[test]
    fn order_chain_preserves_append_order() {
        let q = Query::<Row>::new().order_by("a").order_by_desc("b");
        let order = q.order().expect("order present");
        assert_eq!(
            order.fields,
            vec![
                ("a".to_owned(), OrderDirection::Asc),
                ("b".to_owned(), OrderDirection::Desc),
            ]
        );
    }

    #[test]
    fn tracking_defaults_off() {
        assert!(!Query::<Row>::new().is_tracked());
        assert!(Query::<Row>::new().track().is_tracked());
    }
}
