//! Pipeline orchestration
//!
//! load → parse → infer schema → encode → partition → train → evaluate → report.
//!
//! Stages run strictly one after another and the first failure aborts the run.
//! Only the file read suspends; every other stage is synchronous.

use tracing::info;

use crate::config::{InferenceScope, RunConfig};
use crate::dataset::{RawRecord, RawTable};
use crate::encoder::{EncodedRecord, RecordEncoder};
use crate::errors::{PipelineError, Result};
use crate::evaluation::evaluate;
use crate::learner::{Learner, Model};
use crate::partition::{Partition, Partitioner};
use crate::report::RunReport;
use crate::schema::Schema;

/// Encoded dataset ready for training, together with the schema that produced it
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub schema: Schema,
    pub partition: Partition<EncodedRecord>,
}

pub struct Pipeline {
    config: RunConfig,
    partitioner: Partitioner,
}

impl Pipeline {
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;
        let partitioner = Partitioner::new(config.split_ratio)?;
        Ok(Self {
            config,
            partitioner,
        })
    }

    /// Execute the full chain against the configured dataset file.
    pub async fn run<L: Learner>(&self, learner: &mut L) -> Result<RunReport> {
        info!("Loading dataset from: {}", self.config.dataset_file.display());
        let table = RawTable::load(&self.config.dataset_file).await?;
        info!(
            "Loaded {} rows with {} columns",
            table.len(),
            table.column_count()
        );

        self.run_records(table.into_records(), learner)
    }

    /// Execute every stage after parsing.
    pub fn run_records<L: Learner>(
        &self,
        records: Vec<RawRecord>,
        learner: &mut L,
    ) -> Result<RunReport> {
        let prepared = self.prepare(records)?;
        let PreparedDataset { schema, partition } = prepared;

        info!("Training on {} records", partition.train.len());
        let mut params = self.config.params;
        let model = learner
            .train(&partition.train, &mut params)
            .map_err(|err| PipelineError::Training(format!("{:#}", err)))?;
        info!("Training finished");
        if let Some(structure) = model.structure() {
            info!("Network structure: {}", structure);
        }

        let evaluation = evaluate(&model, &partition.test)?;
        info!(
            "Testing finished: {}/{} correct",
            evaluation.accuracy.correct,
            evaluation.accuracy.total()
        );

        Ok(RunReport {
            problem_number: self.config.problem_number,
            params,
            structure: model.structure(),
            node_count: model.node_count(),
            train_size: partition.train.len(),
            feature_width: schema.feature_width(),
            accuracy: evaluation.accuracy,
            results: evaluation.results,
        })
    }

    /// Infer descriptors, encode and split according to the configured scope.
    pub fn prepare(&self, records: Vec<RawRecord>) -> Result<PreparedDataset> {
        let types = &self.config.attribute_types;
        let seed = self.config.seed;

        let prepared = match self.config.inference_scope {
            InferenceScope::FullDataset => {
                let schema = Schema::infer(&records, types)?;
                let encoded = RecordEncoder::new(&schema)
                    .with_unseen_policy(self.config.unseen_category)
                    .encode_all(&records)?;
                let partition = self.partitioner.split_seeded(encoded, seed);
                PreparedDataset { schema, partition }
            }
            InferenceScope::TrainOnly => {
                let raw = self.partitioner.split_seeded(records, seed);
                let schema = Schema::infer(&raw.train, types)?;
                let encoder =
                    RecordEncoder::new(&schema).with_unseen_policy(self.config.unseen_category);
                let partition = Partition {
                    train: encoder.encode_all(&raw.train)?,
                    test: encoder.encode_all(&raw.test)?,
                };
                PreparedDataset { schema, partition }
            }
        };

        info!(
            "Encoded {} records into {} features (max class cardinality {})",
            prepared.partition.len(),
            prepared.schema.feature_width(),
            prepared.schema.max_class_cardinality()
        );
        info!(
            "Split into {} training and {} test records",
            prepared.partition.train.len(),
            prepared.partition.test.len()
        );

        Ok(prepared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::MajorityClassLearner;
    use crate::config::{AttributeTypes, UnseenCategoryPolicy};

    fn categorical_rows() -> Vec<RawRecord> {
        (0..10)
            .map(|i| {
                let feature = if i % 2 == 0 { "a" } else { "b" };
                let label = if i < 7 { "yes" } else { "no" };
                vec![feature.to_string(), label.to_string()]
            })
            .collect()
    }

    fn config() -> RunConfig {
        RunConfig {
            attribute_types: AttributeTypes::AllCategorical,
            seed: Some(42),
            ..RunConfig::default()
        }
    }

    #[test]
    fn test_prepare_full_dataset() {
        let pipeline = Pipeline::new(config()).unwrap();
        let prepared = pipeline.prepare(categorical_rows()).unwrap();

        assert_eq!(prepared.partition.train.len(), 9);
        assert_eq!(prepared.partition.test.len(), 1);
        assert_eq!(prepared.schema.feature_width(), 2);
    }

    #[test]
    fn test_run_records_produces_report() {
        let pipeline = Pipeline::new(config()).unwrap();
        let report = pipeline
            .run_records(categorical_rows(), &mut MajorityClassLearner)
            .unwrap();

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.train_size, 9);
        assert_eq!(report.node_count, Some(1));
        assert!((0.0..=1.0).contains(&report.accuracy()));
    }

    #[test]
    fn test_same_seed_same_split() {
        let pipeline = Pipeline::new(config()).unwrap();
        let first = pipeline.prepare(categorical_rows()).unwrap();
        let second = pipeline.prepare(categorical_rows()).unwrap();
        assert_eq!(first.partition, second.partition);
    }

    #[test]
    fn test_train_only_rejects_unseen_by_default() {
        // The single "c" row can only ever land in one subset
        let mut rows = categorical_rows();
        rows.push(vec!["c".to_string(), "yes".to_string()]);

        let train_only = RunConfig {
            inference_scope: InferenceScope::TrainOnly,
            ..config()
        };

        let mut saw_rejection = false;
        for seed in 0..100 {
            let pipeline = Pipeline::new(RunConfig {
                seed: Some(seed),
                ..train_only.clone()
            })
            .unwrap();
            match pipeline.prepare(rows.clone()) {
                Ok(prepared) => assert_eq!(prepared.partition.len(), 11),
                Err(PipelineError::UnknownCategory { column: 0, .. }) => saw_rejection = true,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert!(saw_rejection);
    }

    #[test]
    fn test_train_only_zero_vector_never_fails_on_features() {
        let mut rows = categorical_rows();
        rows.push(vec!["c".to_string(), "yes".to_string()]);

        for seed in 0..100 {
            let pipeline = Pipeline::new(RunConfig {
                seed: Some(seed),
                inference_scope: InferenceScope::TrainOnly,
                unseen_category: UnseenCategoryPolicy::ZeroVector,
                ..config()
            })
            .unwrap();
            let prepared = pipeline.prepare(rows.clone()).unwrap();
            let width = prepared.schema.feature_width();
            for record in prepared.partition.train.iter().chain(&prepared.partition.test) {
                assert_eq!(record.input.len(), width);
            }
        }
    }

    #[test]
    fn test_training_failure_is_reported() {
        let pipeline = Pipeline::new(RunConfig {
            split_ratio: 0.05,
            ..config()
        })
        .unwrap();
        // floor(10 * 0.05) = 0 training records
        let err = pipeline
            .run_records(categorical_rows(), &mut MajorityClassLearner)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Training(_)));
    }

    #[test]
    fn test_empty_test_set_aborts() {
        let pipeline = Pipeline::new(RunConfig {
            split_ratio: 1.0,
            ..config()
        })
        .unwrap();
        let err = pipeline
            .run_records(categorical_rows(), &mut MajorityClassLearner)
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmptyTestSet));
    }
}
