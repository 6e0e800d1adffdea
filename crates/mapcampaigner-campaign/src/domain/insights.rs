//! Analysis-function plugins ("insights functions").
//!
//! A campaign's `selected_functions` names plugins by string. Plugins are
//! resolved through an explicit [`InsightRegistry`]; a name that is not
//! registered degrades to empty output instead of failing.

use std::collections::HashMap;
use std::fmt;

use mapcampaigner_core::error::DomainError;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::aggregates::Campaign;
use super::record::{Attributes, CampaignRecord, SelectedFunction};

/// Capability interface every analysis-function plugin implements.
pub trait InsightFunction {
    /// Display name. Text after the first `-` is a qualifier that widgets
    /// do not show.
    fn name(&self) -> String;

    /// Icon reference shown next to the widget.
    fn icon(&self) -> &str;

    /// Whether only campaign managers may see the function.
    fn manager_only(&self) -> bool;

    /// Rendered UI fragment.
    fn ui_html(&self) -> String;

    /// Metadata describing the function's data.
    fn metadata(&self) -> Attributes;
}

/// What a plugin is constructed from.
#[derive(Debug, Clone)]
pub struct InsightContext<'a> {
    pub campaign: &'a CampaignRecord,
    pub feature: &'a str,
    pub required_attributes: &'a Value,
    pub additional_data: Attributes,
}

/// Builds a plugin instance for one campaign.
pub type InsightConstructor = for<'a> fn(InsightContext<'a>) -> Box<dyn InsightFunction + 'a>;

/// Name-to-constructor table of the available plugins.
#[derive(Clone, Default)]
pub struct InsightRegistry {
    constructors: HashMap<String, InsightConstructor>,
}

impl InsightRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `constructor` under `name`, replacing any earlier entry.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, constructor: InsightConstructor) -> Self {
        self.constructors.insert(name.into(), constructor);
        self
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Constructs the plugin a descriptor names, or `None` if the name is
    /// not registered.
    #[must_use]
    pub fn instantiate<'a>(
        &self,
        descriptor: &'a SelectedFunction,
        campaign: &'a CampaignRecord,
        additional_data: Attributes,
    ) -> Option<Box<dyn InsightFunction + 'a>> {
        let constructor = self.constructors.get(&descriptor.function)?;
        Some(constructor(InsightContext {
            campaign,
            feature: &descriptor.feature,
            required_attributes: &descriptor.attributes,
            additional_data,
        }))
    }
}

impl fmt::Debug for InsightRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.constructors.keys().collect();
        names.sort();
        f.debug_struct("InsightRegistry")
            .field("functions", &names)
            .finish()
    }
}

/// What the rendering boundary receives for one insight widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsightWidget {
    pub name: String,
    pub icon: String,
    pub widget: String,
}

/// Turns an insight widget into an HTML fragment. Template rendering lives
/// outside this crate.
pub trait WidgetRenderer {
    fn render(&self, widget: &InsightWidget) -> String;
}

impl<F: Fn(&InsightWidget) -> String> WidgetRenderer for F {
    fn render(&self, widget: &InsightWidget) -> String {
        self(widget)
    }
}

impl Campaign {
    /// Renders the widget of the selected function `function_id`.
    ///
    /// `additional_data` is handed to the plugin with `function_id` added.
    /// Returns an empty fragment when the function's plugin is not
    /// registered.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::FunctionNotAssigned` if the campaign has no
    /// function `function_id`.
    pub fn render_insights_function(
        &self,
        function_id: &str,
        mut additional_data: Attributes,
        registry: &InsightRegistry,
        renderer: &dyn WidgetRenderer,
    ) -> Result<String, DomainError> {
        let descriptor = self.selected_function(function_id)?;
        additional_data.insert("function_id".to_owned(), Value::from(function_id));

        let Some(function) = registry.instantiate(descriptor, &self.record, additional_data) else {
            debug!(function_id, plugin = %descriptor.function, "insights plugin not registered");
            return Ok(String::new());
        };

        let name = function.name();
        let widget = InsightWidget {
            name: name.split('-').next().unwrap_or_default().to_owned(),
            icon: function.icon().to_owned(),
            widget: function.ui_html(),
        };
        Ok(renderer.render(&widget))
    }

    /// Metadata of the selected function `function_id`; empty when its
    /// plugin is not registered.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::FunctionNotAssigned` if the campaign has no
    /// function `function_id`.
    pub fn insights_function_metadata(
        &self,
        function_id: &str,
        registry: &InsightRegistry,
    ) -> Result<Attributes, DomainError> {
        let descriptor = self.selected_function(function_id)?;
        Ok(registry
            .instantiate(descriptor, &self.record, Attributes::new())
            .map(|function| function.metadata())
            .unwrap_or_default())
    }

    /// The selected functions with `name` and `manager_only` filled in from
    /// their plugins. Descriptors whose plugin is not registered are
    /// returned as stored.
    #[must_use]
    pub fn annotated_selected_functions(&self, registry: &InsightRegistry) -> Value {
        let annotated = self
            .record
            .selected_functions
            .iter()
            .map(|(id, descriptor)| {
                let mut value =
                    serde_json::to_value(descriptor).unwrap_or_else(|_| Value::Object(Attributes::new()));
                if let (Some(function), Some(fields)) = (
                    registry.instantiate(descriptor, &self.record, Attributes::new()),
                    value.as_object_mut(),
                ) {
                    fields.insert("manager_only".to_owned(), Value::from(function.manager_only()));
                    fields.insert("name".to_owned(), Value::from(function.name()));
                }
                (id.clone(), value)
            })
            .collect();
        Value::Object(annotated)
    }

    fn selected_function(&self, function_id: &str) -> Result<&SelectedFunction, DomainError> {
        self.record
            .selected_functions
            .get(function_id)
            .ok_or_else(|| DomainError::FunctionNotAssigned(function_id.to_owned()))
    }
}
