//! FILENAME: core/pivot-engine/src/cube.rs
//! Data Cube - a fetched flat value array and the arithmetic to address it.
//!
//! Values are stored row-major in dimension order: the last dimension varies
//! fastest. The stride of dimension `i` is the product of the sizes of every
//! dimension after it, so the offset of an index vector is `Σ idx[i] * stride[i]`.
//! Layout changes never touch the values, the dimension order or the strides.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use catalog::{Catalog, CategoryMetadata, Dimension};
use crate::error::LayoutError;

/// One category index per cube dimension.
pub type IndexVec = SmallVec<[usize; 8]>;

// ============================================================================
// INPUT
// ============================================================================

/// JSON-stat style fragment returned by a data fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CubeInput {
    #[serde(default)]
    pub label: Option<String>,

    /// Dimension codes in storage order.
    pub id: Vec<String>,

    /// Category count per dimension, parallel to `id`.
    pub size: Vec<usize>,

    /// Flat values; `null` for missing observations.
    pub value: Vec<Option<f64>>,

    /// Optional category codes and labels per dimension.
    #[serde(default)]
    pub dimension: BTreeMap<String, CubeDimensionInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CubeDimensionInput {
    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub category: CategoryMetadata,
}

impl CubeInput {
    pub fn from_json_str(json: &str) -> Result<Self, LayoutError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// DATA CUBE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct DataCube {
    dimensions: Vec<String>,
    sizes: Vec<usize>,
    strides: Vec<usize>,
    values: Vec<Option<f64>>,
}

/// Right-to-left strides and the total cell count, or `None` on overflow.
pub fn compute_strides(sizes: &[usize]) -> Option<(Vec<usize>, usize)> {
    let mut strides = vec![0; sizes.len()];
    let mut acc: usize = 1;
    for (i, &size) in sizes.iter().enumerate().rev() {
        strides[i] = acc;
        acc = acc.checked_mul(size)?;
    }
    Some((strides, acc))
}

impl DataCube {
    pub fn new(
        dimensions: Vec<String>,
        sizes: Vec<usize>,
        values: Vec<Option<f64>>,
    ) -> Result<Self, LayoutError> {
        if dimensions.len() != sizes.len() {
            return Err(LayoutError::DimensionCountMismatch {
                ids: dimensions.len(),
                sizes: sizes.len(),
            });
        }
        for (i, code) in dimensions.iter().enumerate() {
            if dimensions[..i].contains(code) {
                return Err(LayoutError::DuplicateDimension(code.clone()));
            }
        }

        let (strides, total) = compute_strides(&sizes).ok_or(LayoutError::ShapeOverflow)?;
        if values.len() != total {
            return Err(LayoutError::ValueCountMismatch {
                expected: total,
                actual: values.len(),
            });
        }

        Ok(DataCube {
            dimensions,
            sizes,
            strides,
            values,
        })
    }

    pub fn from_input(input: &CubeInput) -> Result<Self, LayoutError> {
        Self::new(input.id.clone(), input.size.clone(), input.value.clone())
    }

    pub fn dimensions(&self) -> &[String] {
        &self.dimensions
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Storage position of a dimension.
    pub fn position(&self, dimension: &str) -> Option<usize> {
        self.dimensions.iter().position(|d| d == dimension)
    }

    pub fn size_of(&self, dimension: &str) -> Option<usize> {
        self.position(dimension).map(|i| self.sizes[i])
    }

    /// Flat offset of an index vector given in dimension order.
    pub fn offset(&self, indices: &[usize]) -> Result<usize, LayoutError> {
        if indices.len() != self.dimensions.len() {
            return Err(LayoutError::IndexArity {
                expected: self.dimensions.len(),
                actual: indices.len(),
            });
        }
        let mut offset = 0;
        for (i, &index) in indices.iter().enumerate() {
            if index >= self.sizes[i] {
                return Err(LayoutError::IndexOutOfRange {
                    dimension: self.dimensions[i].clone(),
                    index,
                    size: self.sizes[i],
                });
            }
            offset += index * self.strides[i];
        }
        Ok(offset)
    }

    /// Inverse of `offset`.
    pub fn index_of(&self, offset: usize) -> Result<IndexVec, LayoutError> {
        if offset >= self.values.len() {
            return Err(LayoutError::OffsetOutOfRange {
                offset,
                len: self.values.len(),
            });
        }
        let mut rest = offset;
        Ok(self
            .strides
            .iter()
            .map(|&stride| {
                let index = rest / stride;
                rest %= stride;
                index
            })
            .collect())
    }

    pub fn value_at(&self, indices: &[usize]) -> Result<Option<f64>, LayoutError> {
        let offset = self.offset(indices)?;
        Ok(self.values[offset])
    }

    /// Value at a precomputed offset; `None` when missing or out of range.
    pub(crate) fn value_at_offset(&self, offset: usize) -> Option<f64> {
        self.values.get(offset).copied().flatten()
    }
}

// ============================================================================
// AXES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisCategory {
    pub code: String,
    pub label: String,
}

/// Categories of one cube dimension, in cube index order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisDimension {
    pub code: String,
    pub label: String,
    pub categories: Vec<AxisCategory>,
}

impl AxisDimension {
    /// Axis over a catalog dimension. With `codes`, only those categories are
    /// kept (a fetched result covers the queried codes only); the order is
    /// always the catalog index order.
    pub fn from_dimension(dimension: &Dimension, codes: Option<&[String]>) -> Self {
        let categories = dimension
            .categories()
            .iter()
            .filter(|c| codes.map_or(true, |codes| codes.contains(&c.code)))
            .map(|c| AxisCategory {
                code: c.code.clone(),
                label: c.label.clone(),
            })
            .collect();
        AxisDimension {
            code: dimension.code.clone(),
            label: dimension.label.clone(),
            categories,
        }
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Codes and labels for every dimension of a cube, in cube order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeAxes {
    dimensions: Vec<AxisDimension>,
}

impl CubeAxes {
    pub fn new(dimensions: Vec<AxisDimension>) -> Self {
        CubeAxes { dimensions }
    }

    /// Reads axes from the cube input. Dimensions without a category block
    /// get positional codes `"0".."n-1"`.
    pub fn from_input(input: &CubeInput) -> Result<Self, LayoutError> {
        let mut dimensions = Vec::with_capacity(input.id.len());
        for (i, code) in input.id.iter().enumerate() {
            let size = input.size.get(i).copied().unwrap_or(0);
            let axis = match input.dimension.get(code) {
                Some(dim) => {
                    let categories = dim
                        .category
                        .ordered_codes(code)?
                        .into_iter()
                        .map(|(cat_code, _)| AxisCategory {
                            label: dim.category.label_for(&cat_code),
                            code: cat_code,
                        })
                        .collect();
                    AxisDimension {
                        code: code.clone(),
                        label: dim.label.clone().unwrap_or_else(|| code.clone()),
                        categories,
                    }
                }
                None => AxisDimension {
                    code: code.clone(),
                    label: code.clone(),
                    categories: (0..size)
                        .map(|n| AxisCategory {
                            code: n.to_string(),
                            label: n.to_string(),
                        })
                        .collect(),
                },
            };
            dimensions.push(axis);
        }
        Ok(CubeAxes { dimensions })
    }

    /// Axes from the catalog for the cube's dimensions. `selected` gives the
    /// queried base codes per dimension; a missing entry means every category.
    pub fn from_catalog(
        catalog: &Catalog,
        cube: &DataCube,
        selected: &BTreeMap<String, Vec<String>>,
    ) -> Result<Self, LayoutError> {
        let mut dimensions = Vec::with_capacity(cube.dimensions().len());
        for code in cube.dimensions() {
            let dim = catalog.require(code)?;
            let codes = selected.get(code).map(Vec::as_slice);
            dimensions.push(AxisDimension::from_dimension(dim, codes));
        }
        let axes = CubeAxes { dimensions };
        axes.check(cube)?;
        Ok(axes)
    }

    pub fn dimensions(&self) -> &[AxisDimension] {
        &self.dimensions
    }

    pub fn dimension(&self, code: &str) -> Option<&AxisDimension> {
        self.dimensions.iter().find(|d| d.code == code)
    }

    /// Every cube dimension has an axis with exactly `size` categories.
    pub fn check(&self, cube: &DataCube) -> Result<(), LayoutError> {
        for (code, &size) in cube.dimensions().iter().zip(cube.sizes()) {
            let axis = self
                .dimension(code)
                .ok_or_else(|| LayoutError::UnknownDimension(code.clone()))?;
            if axis.len() != size {
                return Err(LayoutError::AxisMismatch {
                    dimension: code.clone(),
                    expected: size,
                    actual: axis.len(),
                });
            }
        }
        Ok(())
    }
}
