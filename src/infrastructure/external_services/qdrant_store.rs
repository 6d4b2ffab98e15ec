use async_trait::async_trait;
use qdrant_client::qdrant::{
    self, CreateCollectionBuilder, Distance, OptimizersConfigDiff, PointId, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Qdrant, QdrantError};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::application::ports::vector_store::{VectorStore, VectorStoreError};
use crate::domain::entities::{ScoredPoint, VectorPoint};
use crate::domain::value_objects::{CollectionSchema, DistanceMetric};
use crate::infrastructure::config::{self, ConfigError};

const DEFAULT_SEGMENT_NUMBER: u64 = 2;

#[derive(Debug, Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl QdrantConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(config::env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            url: config::optional(&lookup, "QDRANT_URL")
                .unwrap_or_else(|| "http://localhost:6334".to_string()),
            api_key: config::optional(&lookup, "QDRANT_API_KEY"),
            timeout: config::seconds(&lookup, "QDRANT_TIMEOUT_SECS", 30)?,
        })
    }
}

pub struct QdrantVectorStore {
    client: Qdrant,
}

impl QdrantVectorStore {
    pub fn new(config: QdrantConfig) -> Result<Self, VectorStoreError> {
        let mut builder = Qdrant::from_url(&config.url).timeout(config.timeout);

        if let Some(api_key) = config.api_key {
            builder = builder.api_key(api_key);
        }

        let client = builder
            .build()
            .map_err(|e| VectorStoreError::Backend(format!("Failed to build client: {}", e)))?;

        Ok(Self { client })
    }

    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::new(QdrantConfig::from_env()?)?)
    }
}

fn backend_error(error: QdrantError) -> VectorStoreError {
    VectorStoreError::Backend(error.to_string())
}

fn to_qdrant_distance(metric: DistanceMetric) -> Distance {
    match metric {
        DistanceMetric::Cosine => Distance::Cosine,
        DistanceMetric::Dot => Distance::Dot,
        DistanceMetric::Euclid => Distance::Euclid,
        DistanceMetric::Manhattan => Distance::Manhattan,
    }
}

fn from_qdrant_distance(distance: Distance) -> Option<DistanceMetric> {
    match distance {
        Distance::Cosine => Some(DistanceMetric::Cosine),
        Distance::Dot => Some(DistanceMetric::Dot),
        Distance::Euclid => Some(DistanceMetric::Euclid),
        Distance::Manhattan => Some(DistanceMetric::Manhattan),
        _ => None,
    }
}

/// Reads the single unnamed vector config of a collection.
fn schema_from_info(
    name: &str,
    info: &qdrant::CollectionInfo,
) -> Result<CollectionSchema, VectorStoreError> {
    let params = info
        .config
        .as_ref()
        .and_then(|config| config.params.as_ref())
        .and_then(|params| params.vectors_config.as_ref())
        .and_then(|vectors| vectors.config.as_ref());

    match params {
        Some(qdrant::vectors_config::Config::Params(p)) => {
            let distance = from_qdrant_distance(p.distance()).ok_or_else(|| {
                VectorStoreError::UnsupportedSchema(format!(
                    "{} uses unknown distance {:?}",
                    name,
                    p.distance()
                ))
            })?;
            Ok(CollectionSchema::new(name, p.size, distance))
        }
        Some(qdrant::vectors_config::Config::ParamsMap(_)) => Err(
            VectorStoreError::UnsupportedSchema(format!("{} uses named vectors", name)),
        ),
        None => Err(VectorStoreError::UnsupportedSchema(format!(
            "{} has no vector config",
            name
        ))),
    }
}

fn json_to_qdrant_value(val: Value) -> Option<QdrantValue> {
    match val {
        Value::Null => None,
        Value::Bool(b) => Some(QdrantValue::from(b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(QdrantValue::from(i)),
            None => n.as_f64().map(QdrantValue::from),
        },
        Value::String(s) => Some(QdrantValue::from(s)),
        other => Some(QdrantValue::from(other.to_string())),
    }
}

fn qdrant_value_to_json(val: QdrantValue) -> Option<Value> {
    use qdrant::value::Kind;

    match val.kind {
        Some(Kind::NullValue(_)) => Some(Value::Null),
        Some(Kind::BoolValue(b)) => Some(Value::Bool(b)),
        Some(Kind::IntegerValue(i)) => Some(Value::Number(i.into())),
        Some(Kind::DoubleValue(f)) => serde_json::Number::from_f64(f).map(Value::Number),
        Some(Kind::StringValue(s)) => Some(Value::String(s)),
        _ => None,
    }
}

fn payload_to_qdrant(payload: Map<String, Value>) -> HashMap<String, QdrantValue> {
    payload
        .into_iter()
        .filter_map(|(key, val)| json_to_qdrant_value(val).map(|v| (key, v)))
        .collect()
}

fn payload_to_json(payload: HashMap<String, QdrantValue>) -> Map<String, Value> {
    payload
        .into_iter()
        .filter_map(|(key, val)| qdrant_value_to_json(val).map(|v| (key, v)))
        .collect()
}

fn point_id_to_string(point_id: Option<PointId>) -> String {
    use qdrant::point_id::PointIdOptions;

    match point_id.and_then(|id| id.point_id_options) {
        Some(PointIdOptions::Uuid(uuid)) => uuid,
        Some(PointIdOptions::Num(num)) => num.to_string(),
        None => String::new(),
    }
}

fn to_point_struct(point: &VectorPoint) -> PointStruct {
    PointStruct::new(
        PointId::from(point.id().to_string()),
        point.vector().to_vec(),
        payload_to_qdrant(point.payload().to_json()),
    )
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn collection_schema(
        &self,
        name: &str,
    ) -> Result<Option<CollectionSchema>, VectorStoreError> {
        if !self
            .client
            .collection_exists(name)
            .await
            .map_err(backend_error)?
        {
            return Ok(None);
        }

        let info = self
            .client
            .collection_info(name)
            .await
            .map_err(backend_error)?
            .result
            .ok_or_else(|| VectorStoreError::Backend(format!("No info returned for {}", name)))?;

        schema_from_info(name, &info).map(Some)
    }

    async fn create_collection(&self, schema: &CollectionSchema) -> Result<(), VectorStoreError> {
        let builder = CreateCollectionBuilder::new(&schema.name)
            .vectors_config(VectorParamsBuilder::new(
                schema.vector_size,
                to_qdrant_distance(schema.distance),
            ))
            .optimizers_config(OptimizersConfigDiff {
                default_segment_number: Some(DEFAULT_SEGMENT_NUMBER),
                ..Default::default()
            });

        self.client
            .create_collection(builder)
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn upsert_points(
        &self,
        collection: &str,
        points: Vec<VectorPoint>,
    ) -> Result<(), VectorStoreError> {
        debug!(
            "Upserting {} points of dimension {} into {}",
            points.len(),
            points.first().map_or(0, VectorPoint::dimension),
            collection
        );
        let points: Vec<PointStruct> = points.iter().map(to_point_struct).collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(collection, points).wait(true))
            .await
            .map_err(backend_error)?;

        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<ScoredPoint>, VectorStoreError> {
        let response = self
            .client
            .search_points(SearchPointsBuilder::new(collection, vector, limit).with_payload(true))
            .await
            .map_err(backend_error)?;

        Ok(response
            .result
            .into_iter()
            .map(|point| ScoredPoint {
                id: point_id_to_string(point.id),
                score: point.score,
                payload: payload_to_json(point.payload),
            })
            .collect())
    }
}
