// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

//! The build pipeline: a fixed sequence of stages, each taking the previous stage's
//! [`BuildContext`] and returning the next one.

use std::sync::Arc;

use poly_catalog::Catalog;
use relation_model::PolymorphicConstraint;
use tracing::{debug, info, instrument};

use crate::{
    CONNECTION_FILTER, HostCapabilities, HostSchema, PolyBuildingError, PolySchemaExtension,
    config::PolyRelationOptions,
    constraint_extractor::extract_constraints,
    field_synthesizer::{TypedField, backward_relation_fields, forward_relation_fields},
    filter_synthesizer::{add_backward_filter_fields, add_forward_filter_fields},
    inflection::Inflector,
    model_map::ModelMap,
};

/// What every stage reads and none modifies.
#[derive(Clone, Copy)]
pub struct BuildInputs<'a> {
    pub catalog: &'a Catalog,
    pub options: &'a PolyRelationOptions,
    pub inflector: &'a dyn Inflector,
    pub capabilities: &'a HostCapabilities,
    pub host_schema: &'a HostSchema,
}

/// State accumulated by the stages run so far.
#[derive(Debug, Clone, Default)]
pub struct BuildContext {
    model_map: Option<Arc<ModelMap>>,
    constraints: Option<Arc<Vec<PolymorphicConstraint>>>,
    extension: PolySchemaExtension,
}

impl BuildContext {
    pub fn with_model_map(self, model_map: ModelMap) -> Self {
        Self {
            model_map: Some(Arc::new(model_map)),
            ..self
        }
    }

    /// Add constraints to the ones found by earlier stages.
    pub fn with_constraints(self, constraints: Vec<PolymorphicConstraint>) -> Self {
        let constraints = match self.constraints {
            Some(existing) => existing.iter().cloned().chain(constraints).collect(),
            None => constraints,
        };

        Self {
            constraints: Some(Arc::new(constraints)),
            ..self
        }
    }

    pub fn with_extension(self, extension: PolySchemaExtension) -> Self {
        Self { extension, ..self }
    }

    pub fn model_map(&self) -> Option<&ModelMap> {
        self.model_map.as_deref()
    }

    pub fn constraints(&self) -> Option<&[PolymorphicConstraint]> {
        self.constraints.as_deref().map(Vec::as_slice)
    }

    pub fn extension(&self) -> &PolySchemaExtension {
        &self.extension
    }

    pub fn into_extension(self) -> PolySchemaExtension {
        self.extension
    }

    fn require_constraints(
        &self,
        required_by: &str,
    ) -> Result<Arc<Vec<PolymorphicConstraint>>, PolyBuildingError> {
        self.constraints
            .clone()
            .ok_or_else(|| PolyBuildingError::missing(ConstraintStage.name(), required_by))
    }
}

pub trait BuildStage {
    fn name(&self) -> &'static str;

    /// Checked for every stage of a plugin before any stage runs.
    fn check_preconditions(&self, _inputs: &BuildInputs<'_>) -> Result<(), PolyBuildingError> {
        Ok(())
    }

    fn run(
        &self,
        inputs: &BuildInputs<'_>,
        context: BuildContext,
    ) -> Result<BuildContext, PolyBuildingError>;
}

/// Maps model names to tables and back.
pub struct ModelMapStage;

impl BuildStage for ModelMapStage {
    fn name(&self) -> &'static str {
        "PolymorphicModelMap"
    }

    #[instrument(name = "ModelMapStage::run", skip_all)]
    fn run(
        &self,
        inputs: &BuildInputs<'_>,
        context: BuildContext,
    ) -> Result<BuildContext, PolyBuildingError> {
        let model_map = ModelMap::build(inputs.catalog, inputs.options, inputs.inflector)?;
        debug!(models = model_map.len(), "Built the model map");

        Ok(context.with_model_map(model_map))
    }
}

/// Finds polymorphic associations and resolves their targets.
pub struct ConstraintStage;

impl BuildStage for ConstraintStage {
    fn name(&self) -> &'static str {
        "PolymorphicConstraint"
    }

    #[instrument(name = "ConstraintStage::run", skip_all)]
    fn run(
        &self,
        inputs: &BuildInputs<'_>,
        context: BuildContext,
    ) -> Result<BuildContext, PolyBuildingError> {
        let model_map = context
            .model_map()
            .ok_or_else(|| PolyBuildingError::missing(ModelMapStage.name(), self.name()))?;

        let constraints = extract_constraints(inputs.catalog, inputs.options, model_map);
        info!(count = constraints.len(), "Found polymorphic associations");

        Ok(context.with_constraints(constraints))
    }
}

/// Adds `<target>As<Association>` fields to the tables holding an association.
pub struct ForwardRelationStage;

impl BuildStage for ForwardRelationStage {
    fn name(&self) -> &'static str {
        "PolymorphicForwardRelation"
    }

    #[instrument(name = "ForwardRelationStage::run", skip_all)]
    fn run(
        &self,
        inputs: &BuildInputs<'_>,
        context: BuildContext,
    ) -> Result<BuildContext, PolyBuildingError> {
        let constraints = context.require_constraints(self.name())?;
        let fields = forward_relation_fields(inputs, &constraints);

        add_relation_fields(inputs, context, fields)
    }
}

/// Adds fields reading back the rows pointing at a target table.
pub struct BackwardRelationStage;

impl BuildStage for BackwardRelationStage {
    fn name(&self) -> &'static str {
        "PolymorphicBackwardRelation"
    }

    #[instrument(name = "BackwardRelationStage::run", skip_all)]
    fn run(
        &self,
        inputs: &BuildInputs<'_>,
        context: BuildContext,
    ) -> Result<BuildContext, PolyBuildingError> {
        let constraints = context.require_constraints(self.name())?;
        let fields = backward_relation_fields(inputs, &constraints);

        add_relation_fields(inputs, context, fields)
    }
}

fn add_relation_fields(
    inputs: &BuildInputs<'_>,
    context: BuildContext,
    fields: Vec<TypedField>,
) -> Result<BuildContext, PolyBuildingError> {
    let mut extension = context.extension().clone();
    for (type_name, field) in fields {
        debug!(%type_name, field = %field.name, "Adding relation field");
        extension.add_relation_field(&type_name, field, inputs.host_schema)?;
    }

    Ok(context.with_extension(extension))
}

/// Adds filter fields following the relations, in the directions enabled by the options.
pub struct RelationFilterStage;

impl BuildStage for RelationFilterStage {
    fn name(&self) -> &'static str {
        "PolymorphicRelationFilter"
    }

    fn check_preconditions(&self, inputs: &BuildInputs<'_>) -> Result<(), PolyBuildingError> {
        if inputs.options.filters_enabled() && !inputs.capabilities.has(CONNECTION_FILTER) {
            return Err(PolyBuildingError::missing(CONNECTION_FILTER, self.name()));
        }
        Ok(())
    }

    #[instrument(name = "RelationFilterStage::run", skip_all)]
    fn run(
        &self,
        inputs: &BuildInputs<'_>,
        context: BuildContext,
    ) -> Result<BuildContext, PolyBuildingError> {
        let options = inputs.options;
        if !options.filters_enabled() {
            debug!("Relation filters are disabled");
            return Ok(context);
        }
        self.check_preconditions(inputs)?;

        let constraints = context.require_constraints(self.name())?;
        let mut extension = context.extension().clone();

        if options.filter_forward {
            add_forward_filter_fields(inputs, &constraints, &mut extension)?;
        }
        if options.filter_backward {
            add_backward_filter_fields(inputs, &constraints, &mut extension)?;
        }

        Ok(context.with_extension(extension))
    }
}

/// The polymorphic relation plugins, run in order over a catalog.
pub struct PolyRelationPlugin {
    stages: Vec<Box<dyn BuildStage>>,
}

impl Default for PolyRelationPlugin {
    fn default() -> Self {
        Self::with_stages(vec![
            Box::new(ModelMapStage),
            Box::new(ConstraintStage),
            Box::new(ForwardRelationStage),
            Box::new(BackwardRelationStage),
            Box::new(RelationFilterStage),
        ])
    }
}

impl PolyRelationPlugin {
    pub fn with_stages(stages: Vec<Box<dyn BuildStage>>) -> Self {
        Self { stages }
    }

    pub fn stage_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.iter().map(|stage| stage.name())
    }

    pub fn build(&self, inputs: &BuildInputs<'_>) -> Result<PolySchemaExtension, PolyBuildingError> {
        self.run(inputs, BuildContext::default())
            .map(BuildContext::into_extension)
    }

    pub fn run(
        &self,
        inputs: &BuildInputs<'_>,
        context: BuildContext,
    ) -> Result<BuildContext, PolyBuildingError> {
        for stage in &self.stages {
            stage.check_preconditions(inputs)?;
        }

        self.stages
            .iter()
            .try_fold(context, |context, stage| {
                debug!(stage = stage.name(), "Running stage");
                stage.run(inputs, context)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{inflection::DefaultInflector, test_utils};

    fn run_stages(
        stages: Vec<Box<dyn BuildStage>>,
        options: &PolyRelationOptions,
        capabilities: &HostCapabilities,
    ) -> Result<BuildContext, PolyBuildingError> {
        let catalog = test_utils::catalog();
        let host_schema = HostSchema::new();
        let inputs = BuildInputs {
            catalog: &catalog,
            options,
            inflector: &DefaultInflector,
            capabilities,
            host_schema: &host_schema,
        };

        PolyRelationPlugin::with_stages(stages).run(&inputs, BuildContext::default())
    }

    #[test]
    fn default_stage_order() {
        assert_eq!(
            PolyRelationPlugin::default().stage_names().collect::<Vec<_>>(),
            vec![
                "PolymorphicModelMap",
                "PolymorphicConstraint",
                "PolymorphicForwardRelation",
                "PolymorphicBackwardRelation",
                "PolymorphicRelationFilter"
            ]
        );
    }

    #[test]
    fn constraint_stage_needs_model_map() {
        let error = run_stages(
            vec![Box::new(ConstraintStage)],
            &PolyRelationOptions::default(),
            &HostCapabilities::new(),
        )
        .unwrap_err();

        assert!(matches!(
            error,
            PolyBuildingError::MissingCapability { capability, required_by }
                if capability == "PolymorphicModelMap" && required_by == "PolymorphicConstraint"
        ));
    }

    #[test]
    fn relation_stages_need_constraints() {
        let stages: [fn() -> Box<dyn BuildStage>; 3] = [
            || Box::new(ForwardRelationStage),
            || Box::new(BackwardRelationStage),
            || Box::new(RelationFilterStage),
        ];

        for stage in stages {
            let stage = stage();
            let name = stage.name();
            let error = run_stages(
                vec![Box::new(ModelMapStage), stage],
                &test_utils::filter_options(),
                &HostCapabilities::new().with(CONNECTION_FILTER),
            )
            .unwrap_err();

            assert!(matches!(
                error,
                PolyBuildingError::MissingCapability { capability, required_by }
                    if capability == "PolymorphicConstraint" && required_by == name
            ));
        }
    }

    #[test]
    fn capability_checked_before_any_stage() {
        // The backward relation stage would fail on the host's `notes` field first
        let catalog = test_utils::catalog();
        let host_schema = HostSchema::new().with_object_fields("Location", ["notes"]);
        let options = test_utils::filter_options();
        let capabilities = HostCapabilities::new();
        let inputs = BuildInputs {
            catalog: &catalog,
            options: &options,
            inflector: &DefaultInflector,
            capabilities: &capabilities,
            host_schema: &host_schema,
        };

        let error = PolyRelationPlugin::default()
            .run(&inputs, BuildContext::default())
            .unwrap_err();

        assert!(matches!(
            error,
            PolyBuildingError::MissingCapability { capability, required_by }
                if capability == CONNECTION_FILTER && required_by == "PolymorphicRelationFilter"
        ));

        // Without the filter stage nothing needs the capability
        let error = PolyRelationPlugin::with_stages(vec![
            Box::new(ModelMapStage),
            Box::new(ConstraintStage),
            Box::new(BackwardRelationStage),
        ])
        .run(&inputs, BuildContext::default())
        .unwrap_err();
        assert!(matches!(error, PolyBuildingError::FieldNameCollision { .. }));
    }

    #[test]
    fn context_snapshots() {
        let context = run_stages(
            vec![Box::new(ModelMapStage), Box::new(ConstraintStage)],
            &PolyRelationOptions::default(),
            &HostCapabilities::new(),
        )
        .unwrap();

        assert_eq!(context.model_map().map(ModelMap::len), Some(6));
        assert_eq!(context.constraints().map(<[_]>::len), Some(3));
        assert!(context.extension().is_empty());

        // A second constraint stage appends rather than replaces
        let again = context.clone().with_constraints(vec![]);
        assert_eq!(again.constraints().map(<[_]>::len), Some(3));
    }
}
