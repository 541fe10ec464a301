/*
This code is part of the Building Point-Cloud Tools library.
Created: 17/10/2026
Last Modified: 17/10/2026
License: MIT
*/

//! `SpatialStore` backed by PostgreSQL with the PostGIS and pgpointcloud
//! extensions. The heavy spatial join runs inside the database; geometries come
//! back as WKB and are decoded here.

use crate::sql::{
    chunk_query_sql, create_listing_sql, drop_listing_sql, listing_count_sql,
    listing_exists_sql, TableNames,
};
use crate::store::{
    BuildingRecord, ChunkData, ChunkQuery, ChunkRange, PointCloudStats, SpatialStore,
};
use bpc_common::structures::{MultiPoint, Point2D, Polygon, Shape};
use bpc_common::{BpcError, Result};
use bpc_vector::wkb_to_shape;
use postgres::{Client, NoTls, Row};
use std::collections::HashMap;

fn store_err(e: postgres::Error) -> BpcError {
    BpcError::Store(e.to_string())
}

fn decode_polygon(bytes: &[u8]) -> Result<Polygon> {
    match wkb_to_shape(bytes)? {
        Shape::Polygon(p) => Ok(p),
        Shape::MultiPolygon(mut v) if v.len() == 1 => Ok(v.remove(0)),
        other => Err(BpcError::Decode(format!(
            "expected a footprint polygon, found a {}",
            other.type_name()
        ))),
    }
}

fn decode_point(bytes: &[u8]) -> Result<Point2D> {
    match wkb_to_shape(bytes)? {
        Shape::Point(p) => Ok(p),
        other => Err(BpcError::Decode(format!(
            "expected an address point, found a {}",
            other.type_name()
        ))),
    }
}

fn decode_multipoint(bytes: &[u8]) -> Result<MultiPoint> {
    match wkb_to_shape(bytes)? {
        Shape::MultiPoint(mp) => Ok(mp),
        other => Err(BpcError::Decode(format!(
            "expected a point-cloud multipoint, found a {}",
            other.type_name()
        ))),
    }
}

pub struct PgPointCloudStore {
    client: Client,
    tables: TableNames,
    listings: HashMap<String, usize>,
}

impl PgPointCloudStore {
    pub fn connect(url: &str, tables: TableNames) -> Result<PgPointCloudStore> {
        let client = Client::connect(url, NoTls).map_err(store_err)?;
        Ok(PgPointCloudStore {
            client,
            tables,
            listings: HashMap::new(),
        })
    }

    fn count(&mut self, sql: &str) -> Result<i64> {
        let row = self.client.query_one(sql, &[]).map_err(store_err)?;
        row.try_get::<_, i64>(0).map_err(store_err)
    }

    fn record_from_row(row: &Row, chunk: &mut ChunkData) -> Result<()> {
        let id_fp: i64 = row.try_get("id_fp").map_err(store_err)?;
        let geom_fp: Vec<u8> = row.try_get("geom_fp").map_err(store_err)?;
        let geom_uprn: Option<Vec<u8>> = row.try_get("geom_uprn").map_err(store_err)?;
        let num_p_in_pc: Option<i64> = row.try_get("num_p_in_pc").map_err(store_err)?;

        let point_cloud = match num_p_in_pc {
            Some(n) => {
                if !chunk.point_clouds.contains_key(&id_fp) {
                    let geom_pc: Vec<u8> = row.try_get("geom_pc").map_err(store_err)?;
                    chunk.point_clouds.insert(id_fp, decode_multipoint(&geom_pc)?);
                }
                Some(PointCloudStats {
                    num_p_in_pc: n.max(0) as usize,
                    delta_x: row.try_get("delta_x").map_err(store_err)?,
                    delta_y: row.try_get("delta_y").map_err(store_err)?,
                    delta_z: row.try_get("delta_z").map_err(store_err)?,
                    z_min: row.try_get("z_min").map_err(store_err)?,
                    scaling_factor: row.try_get("scaling_factor").map_err(store_err)?,
                })
            }
            None => None,
        };

        chunk.records.push(BuildingRecord {
            id_query: row.try_get::<_, i64>("id_query").map_err(store_err)?.max(0) as u64,
            id_fp,
            footprint: decode_polygon(&geom_fp)?,
            uprn: row.try_get("uprn").map_err(store_err)?,
            address_location: match geom_uprn {
                Some(bytes) => Some(decode_point(&bytes)?),
                None => None,
            },
            id_epc_lmk_key: row.try_get("id_epc_lmk_key").map_err(store_err)?,
            energy_rating: row.try_get("energy_rating").map_err(store_err)?,
            energy_efficiency: row.try_get("energy_efficiency").map_err(store_err)?,
            point_cloud,
        });
        Ok(())
    }
}

impl SpatialStore for PgPointCloudStore {
    fn prepare_listing(
        &mut self,
        area_code: &str,
        max_footprints: Option<usize>,
        refresh: bool,
    ) -> Result<usize> {
        if !refresh {
            if let Some(&n) = self.listings.get(area_code) {
                return Ok(n);
            }
        }
        let exists = self.count(&listing_exists_sql(area_code))? > 0;
        if refresh || !exists {
            log::info!("Materializing the footprint listing of {}", area_code);
            let sql = format!(
                "{};\n{};",
                drop_listing_sql(area_code),
                create_listing_sql(&self.tables, area_code, max_footprints)
            );
            self.client.batch_execute(&sql).map_err(store_err)?;
        } else {
            log::info!("Reusing the footprint listing of {}", area_code);
        }
        let total = self.count(&listing_count_sql(area_code))?.max(0) as usize;
        self.listings.insert(area_code.to_string(), total);
        Ok(total)
    }

    fn fetch_chunk(
        &mut self,
        area_code: &str,
        range: ChunkRange,
        query: &ChunkQuery,
    ) -> Result<ChunkData> {
        let sql = chunk_query_sql(&self.tables, area_code);
        let start = range.start as i64;
        let end = range.end as i64;
        let threshold = query.point_count_threshold as i64;
        let rows = self
            .client
            .query(
                sql.as_str(),
                &[&start, &end, &query.buffer_meters, &threshold, &area_code],
            )
            .map_err(store_err)?;
        let mut chunk = ChunkData::default();
        for row in &rows {
            PgPointCloudStore::record_from_row(row, &mut chunk)?;
        }
        chunk.distinct();
        Ok(chunk)
    }
}
