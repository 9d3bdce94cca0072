//! FILENAME: core/catalog/src/catalog.rs
//! The loaded catalog for one table.
//!
//! Built once per metadata load and replaced wholesale on table change. The
//! only mutation after load is display reordering, which never touches the
//! canonical category indices used for addressing.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use crate::codelist::ResolvedCodelist;
use crate::dimension::Dimension;
use crate::error::CatalogError;
use crate::metadata::TableMetadata;
use crate::log_info;

/// Display placement hint from the metadata (`heading` = columns,
/// `stub` = rows).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayHint {
    pub heading: Vec<String>,
    pub stub: Vec<String>,
}

impl DisplayHint {
    pub fn is_empty(&self) -> bool {
        self.heading.is_empty() && self.stub.is_empty()
    }
}

/// Dimension code -> Dimension, in storage order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    label: Option<String>,
    order: Vec<String>,
    dimensions: FxHashMap<String, Dimension>,
    display_hint: DisplayHint,
}

impl Catalog {
    /// Builds the catalog from table metadata.
    pub fn from_metadata(meta: &TableMetadata) -> Result<Self, CatalogError> {
        let mut dims = Vec::with_capacity(meta.id.len());

        for code in &meta.id {
            let dim_meta = meta
                .dimension
                .get(code)
                .ok_or_else(|| CatalogError::MissingDimension(code.clone()))?;

            let categories = dim_meta
                .category
                .ordered_codes(code)?
                .into_iter()
                .map(|(cat_code, _)| {
                    let label = dim_meta.category.label_for(&cat_code);
                    (cat_code, label)
                })
                .collect();

            let (eliminable, codelists) = match &dim_meta.extension {
                Some(ext) => (ext.elimination, ext.codelists.clone()),
                None => (false, Vec::new()),
            };

            dims.push(Dimension::new(
                code.clone(),
                dim_meta.label.clone().unwrap_or_else(|| code.clone()),
                categories,
                eliminable,
                codelists,
            ));
        }

        let mut catalog = Self::from_dimensions(meta.label.clone(), dims)?;

        if let Some(px) = meta.extension.as_ref().and_then(|e| e.px.as_ref()) {
            catalog.display_hint = DisplayHint {
                heading: px.heading.clone(),
                stub: px.stub.clone(),
            };
        }

        log_info!(
            "CATALOG",
            "loaded table {:?}: {} dimensions",
            catalog.label,
            catalog.len()
        );
        Ok(catalog)
    }

    /// Builds a catalog from already constructed dimensions, keeping their order.
    pub fn from_dimensions(
        label: Option<String>,
        dims: Vec<Dimension>,
    ) -> Result<Self, CatalogError> {
        let mut order = Vec::with_capacity(dims.len());
        let mut dimensions = FxHashMap::default();

        for dim in dims {
            if dimensions.contains_key(&dim.code) {
                return Err(CatalogError::DuplicateDimension(dim.code));
            }
            order.push(dim.code.clone());
            dimensions.insert(dim.code.clone(), dim);
        }

        Ok(Catalog {
            label,
            order,
            dimensions,
            display_hint: DisplayHint::default(),
        })
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Dimension codes in storage order.
    pub fn codes(&self) -> &[String] {
        &self.order
    }

    pub fn dimension(&self, code: &str) -> Option<&Dimension> {
        self.dimensions.get(code)
    }

    pub fn require(&self, code: &str) -> Result<&Dimension, CatalogError> {
        self.dimensions
            .get(code)
            .ok_or_else(|| CatalogError::UnknownDimension(code.to_string()))
    }

    /// Dimensions in storage order.
    pub fn dimensions(&self) -> impl Iterator<Item = &Dimension> + '_ {
        self.order.iter().filter_map(move |code| self.dimensions.get(code))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn display_hint(&self) -> &DisplayHint {
        &self.display_hint
    }

    /// First dimension recognised as time-like, if any.
    pub fn time_dimension(&self) -> Option<&Dimension> {
        self.dimensions().find(|d| d.is_time())
    }

    /// Lists time dimensions newest first.
    pub fn reverse_time_display(&mut self) {
        for dim in self.dimensions.values_mut() {
            if dim.is_time() {
                dim.reverse_display();
            }
        }
    }

    /// Makes the base category display of `dimension` follow the entry order
    /// of `codelist` (its value maps flattened).
    pub fn preload_ordering(
        &mut self,
        dimension: &str,
        codelist: &ResolvedCodelist,
    ) -> Result<(), CatalogError> {
        let dim = self
            .dimensions
            .get_mut(dimension)
            .ok_or_else(|| CatalogError::UnknownDimension(dimension.to_string()))?;
        if !dim.has_codelist(&codelist.id) {
            return Err(CatalogError::UnknownCodelist {
                dimension: dimension.to_string(),
                codelist: codelist.id.clone(),
            });
        }

        let ordered: Vec<&str> = codelist
            .entries()
            .iter()
            .flat_map(|e| e.value_map.iter().map(String::as_str))
            .collect();
        dim.set_display_order(&ordered);
        Ok(())
    }
}
