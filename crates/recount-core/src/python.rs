//! Python surface of the catalog: the `DataProcessor` class.
//!
//! Method names follow the processor API that Python callers already use.
//! Misses raise `KeyError`, malformed arguments `ValueError`.

use std::path::PathBuf;

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList, PyTuple};
use pyo3::IntoPyObjectExt;
use serde_json::Value;

use crate::catalog::DatasetCatalog;
use crate::config::CatalogConfig;
use crate::errors::RecountError;
use crate::models::FieldsRecord;

/// Convert a JSON value into the equivalent Python object.
fn json_to_py(py: Python<'_>, value: &Value) -> PyResult<PyObject> {
    match value {
        Value::Null => Ok(py.None()),
        Value::Bool(b) => b.into_py_any(py),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.into_py_any(py)
            } else if let Some(u) = n.as_u64() {
                u.into_py_any(py)
            } else {
                n.as_f64().unwrap_or(f64::NAN).into_py_any(py)
            }
        }
        Value::String(s) => s.as_str().into_py_any(py),
        Value::Array(items) => {
            let list = PyList::empty(py);
            for item in items {
                list.append(json_to_py(py, item)?)?;
            }
            Ok(list.into_any().unbind())
        }
        Value::Object(map) => {
            let dict = PyDict::new(py);
            for (key, item) in map {
                dict.set_item(key, json_to_py(py, item)?)?;
            }
            Ok(dict.into_any().unbind())
        }
    }
}

fn record_to_dict(py: Python<'_>, record: &FieldsRecord) -> PyResult<PyObject> {
    let dict = PyDict::new(py);
    for (key, item) in record.iter() {
        dict.set_item(key, json_to_py(py, item)?)?;
    }
    Ok(dict.into_any().unbind())
}

#[pyclass(frozen)]
pub struct DataProcessor {
    catalog: DatasetCatalog,
}

#[pymethods]
impl DataProcessor {
    /// Load the catalog. Arguments left as `None` come from the `RECOUNT_*`
    /// environment variables, then from the built-in defaults.
    #[new]
    #[pyo3(signature = (data_root=None, annotation_file=None, split_file=None, image_dir=None))]
    fn new(
        data_root: Option<PathBuf>,
        annotation_file: Option<PathBuf>,
        split_file: Option<PathBuf>,
        image_dir: Option<String>,
    ) -> PyResult<Self> {
        let mut config = CatalogConfig::from_env();
        if let Some(data_root) = data_root {
            config = config.with_data_root(data_root);
        }
        if let Some(annotation_file) = annotation_file {
            config = config.with_annotation_file(annotation_file);
        }
        if let Some(split_file) = split_file {
            config = config.with_split_file(split_file);
        }
        if let Some(image_dir) = image_dir {
            config = config.with_image_dir(image_dir);
        }
        let catalog = DatasetCatalog::open(&config.resolve())?;
        Ok(Self { catalog })
    }

    fn get_image_path(&self) -> String {
        self.catalog.image_root().to_string()
    }

    fn get_anno_for_tuple(&self, py: Python<'_>, image_id: &str, caption: &str) -> PyResult<PyObject> {
        let record = self.catalog.annotation(image_id, caption)?;
        record_to_dict(py, record)
    }

    fn get_class_name(&self, image_id: &str, caption: &str) -> PyResult<String> {
        Ok(self.catalog.class_name(image_id, caption)?.to_string())
    }

    fn get_attr_name(&self, image_id: &str, caption: &str) -> PyResult<String> {
        Ok(self.catalog.attribute_name(image_id, caption)?.to_string())
    }

    fn get_type_name(&self, image_id: &str, caption: &str) -> PyResult<String> {
        Ok(self.catalog.type_name(image_id, caption)?.to_string())
    }

    /// Split containing the pair, or `None`.
    fn get_split_type(&self, image_id: &str, caption: &str) -> Option<String> {
        self.catalog
            .split_of(image_id, caption)
            .map(str::to_string)
    }

    /// `[caption]` for an `(image_id, caption)` tuple. The image id may be any
    /// object; a non-tuple, a wrong length or a non-string caption raise
    /// `ValueError`.
    fn get_prompt_for_image(&self, image_id_caption: &Bound<'_, PyAny>) -> PyResult<Vec<String>> {
        let invalid =
            || RecountError::InvalidArgument("input must be a tuple of (image_id, caption)".into());
        let tuple = image_id_caption
            .downcast::<PyTuple>()
            .map_err(|_| invalid())?;
        if tuple.len() != 2 {
            return Err(invalid().into());
        }
        let caption: String = tuple.get_item(1)?.extract().map_err(|_| invalid())?;
        Ok(vec![caption])
    }

    /// `(image_id, caption)` tuples of a split, in dataset order.
    fn get_img_ids_for_split(&self, split: &str) -> PyResult<Vec<(String, String)>> {
        Ok(self
            .catalog
            .members_of_split(split)?
            .iter()
            .cloned()
            .map(Into::into)
            .collect())
    }

    fn split_names(&self) -> Vec<String> {
        self.catalog
            .splits()
            .split_names()
            .map(str::to_string)
            .collect()
    }

    fn summary(&self) -> String {
        self.catalog.summary().to_string()
    }

    fn __len__(&self) -> usize {
        self.catalog.annotations().len()
    }

    fn __repr__(&self) -> String {
        format!(
            "DataProcessor(image_path={:?}, pairs={}, splits={})",
            self.catalog.image_root(),
            self.catalog.annotations().len(),
            self.catalog.splits().len()
        )
    }
}
