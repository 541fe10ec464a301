//! SQL text for the PostgreSQL/PostGIS/pgpointcloud store. Every builder is a
//! pure function of its inputs. Identifiers are double-quoted and literals are
//! single-quoted with embedded quotes doubled.

/// Table names of the backing database.
#[derive(Clone, Debug, PartialEq)]
pub struct TableNames {
    pub lidar: String,
    pub footprints: String,
    pub uprn: String,
    pub epc: String,
    pub boundaries: String,
    /// Column of the boundary table holding the area code.
    pub boundary_code_column: String,
}

impl Default for TableNames {
    fn default() -> TableNames {
        TableNames {
            lidar: "uk_lidar_data".to_string(),
            footprints: "footprints_verisk".to_string(),
            uprn: "uprn".to_string(),
            epc: "epc".to_string(),
            boundaries: "local_authority_boundaries".to_string(),
            boundary_code_column: "lad21cd".to_string(),
        }
    }
}

pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// The materialized view holding the numbered listing of one area.
pub fn listing_view_name(area_code: &str) -> String {
    format!("footprints_{}", area_code.to_lowercase())
}

pub fn listing_exists_sql(area_code: &str) -> String {
    format!(
        "select count(*) from pg_matviews where matviewname = {}",
        quote_literal(&listing_view_name(area_code))
    )
}

pub fn drop_listing_sql(area_code: &str) -> String {
    format!(
        "drop materialized view if exists {}",
        quote_ident(&listing_view_name(area_code))
    )
}

/// Numbers every footprint intersecting the area boundary by footprint id.
pub fn create_listing_sql(
    tables: &TableNames,
    area_code: &str,
    max_footprints: Option<usize>,
) -> String {
    let limit = match max_footprints {
        Some(n) => format!("\n            limit {}", n),
        None => String::new(),
    };
    format!(
        "create materialized view {view} as (
            with area_of_interest as (
                select st_transform(geom, 27700) geom
                from {boundaries} lab
                where lab.{code_col} = {code}
            )
            select row_number() over (order by fps.gid) as id_fp_chunks,
                fps.geom geom_fp,
                fps.gid id_fp
            from {footprints} fps, area_of_interest
            where st_intersects(fps.geom, area_of_interest.geom)
            order by fps.gid{limit}
        )",
        view = quote_ident(&listing_view_name(area_code)),
        boundaries = quote_ident(&tables.boundaries),
        code_col = quote_ident(&tables.boundary_code_column),
        code = quote_literal(area_code),
        footprints = quote_ident(&tables.footprints),
        limit = limit,
    )
}

pub fn listing_count_sql(area_code: &str) -> String {
    format!(
        "select count(*) from {}",
        quote_ident(&listing_view_name(area_code))
    )
}

/// The per-chunk aggregate query. Parameters: `$1` chunk start (exclusive),
/// `$2` chunk end (inclusive), `$3` buffer distance, `$4` point-count
/// threshold, `$5` local-authority code. Geometries are returned as WKB.
pub fn chunk_query_sql(tables: &TableNames, area_code: &str) -> String {
    format!(
        "with footprints as (
            select geom_fp, id_fp
            from {view} aoi
            where aoi.id_fp_chunks > $1 and aoi.id_fp_chunks <= $2
        ),
        fp_buffer as (
            select id_fp, st_buffer(fps.geom_fp, $3::float8) geom_fp
            from footprints fps
        ),
        fp_uprn as (
            select fps.id_fp, fps.geom_fp, u.uprn, u.geom geom_uprn
            from footprints fps
            left join {uprn} u on st_intersects(fps.geom_fp, u.geom)
        ),
        epc as (
            select * from {epc} e where e.\"LOCAL_AUTHORITY\" = $5
        ),
        fp_uprn_epc as (
            select row_number() over (order by fpu.id_fp) as id_uprn_epc, *
            from fp_uprn fpu
            left join epc e on fpu.uprn = e.\"UPRN\"
        ),
        patch_unions as (
            select fpb.id_fp, pc_union(pc_intersection(pa, fpb.geom_fp)) pau
            from {lidar} lp
            inner join fp_buffer fpb on pc_intersects(lp.pa, fpb.geom_fp)
            group by fpb.id_fp
        ),
        building_pc as (
            select
                id_fp,
                st_union(geom) geom_pc,
                max(pc_get(p, 'X')) - min(pc_get(p, 'X')) delta_x,
                max(pc_get(p, 'Y')) - min(pc_get(p, 'Y')) delta_y,
                max(pc_get(p, 'Z')) - min(pc_get(p, 'Z')) delta_z,
                min(pc_get(p, 'Z')) z_min
            from (
                select id_fp, pc_explode(pau) p, pc_explode(pau)::geometry geom
                from patch_unions
            ) po
            group by id_fp
        ),
        building_pc_fp as (
            select
                bpc.id_fp id_fp_bpc,
                bpc.geom_pc,
                bpc.delta_x,
                bpc.delta_y,
                bpc.delta_z,
                bpc.z_min,
                greatest(bpc.delta_x, bpc.delta_y, bpc.delta_z) scaling_factor,
                st_numgeometries(bpc.geom_pc) num_p_in_pc
            from building_pc bpc
            where st_numgeometries(bpc.geom_pc) > $4::int8
        )
        select distinct
            fps.id_uprn_epc id_query,
            fps.id_fp::int8 id_fp,
            fps.uprn::int8 uprn,
            fps.\"LMK_KEY\"::text id_epc_lmk_key,
            st_asbinary(fps.geom_fp) geom_fp,
            st_asbinary(fps.geom_uprn) geom_uprn,
            st_asbinary(bpf.geom_pc) geom_pc,
            bpf.delta_x::float8 delta_x,
            bpf.delta_y::float8 delta_y,
            bpf.delta_z::float8 delta_z,
            bpf.z_min::float8 z_min,
            bpf.scaling_factor::float8 scaling_factor,
            bpf.num_p_in_pc::int8 num_p_in_pc,
            fps.\"CURRENT_ENERGY_RATING\"::text energy_rating,
            fps.\"CURRENT_ENERGY_EFFICIENCY\"::int8 energy_efficiency
        from fp_uprn_epc fps
        left join building_pc_fp bpf on fps.id_fp = bpf.id_fp_bpc
        order by id_query",
        view = quote_ident(&listing_view_name(area_code)),
        uprn = quote_ident(&tables.uprn),
        epc = quote_ident(&tables.epc),
        lidar = quote_ident(&tables.lidar),
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_quoting() {
        assert_eq!(quote_ident("epc"), "\"epc\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
        assert_eq!(quote_literal("O'Neil"), "'O''Neil'");
    }

    #[test]
    fn test_listing_sql() {
        let tables = TableNames::default();
        let sql = create_listing_sql(&tables, "E06000014", Some(250));
        assert!(sql.starts_with("create materialized view \"footprints_e06000014\""));
        assert!(sql.contains("row_number() over (order by fps.gid)"));
        assert!(sql.contains("where lab.\"lad21cd\" = 'E06000014'"));
        assert!(sql.contains("limit 250"));
        assert!(!create_listing_sql(&tables, "E06000014", None).contains("limit"));
        assert!(listing_exists_sql("E06000014").ends_with("= 'footprints_e06000014'"));
        assert_eq!(
            drop_listing_sql("E06000014"),
            "drop materialized view if exists \"footprints_e06000014\""
        );
    }

    #[test]
    fn test_chunk_query_stages() {
        let sql = chunk_query_sql(&TableNames::default(), "E06000014");
        let stages = [
            "with footprints as",
            "fp_buffer as",
            "patch_unions as",
            "building_pc as",
            "building_pc_fp as",
        ];
        let mut last = 0;
        for stage in stages {
            let pos = sql.find(stage).unwrap();
            assert!(pos >= last);
            last = pos;
        }
        assert!(sql.contains("aoi.id_fp_chunks > $1 and aoi.id_fp_chunks <= $2"));
        assert!(sql.contains("st_numgeometries(bpc.geom_pc) > $4::int8"));
        assert!(sql.contains("from \"uk_lidar_data\" lp"));
        assert!(sql.contains("st_asbinary(bpf.geom_pc) geom_pc"));
        // addresses are joined to the unbuffered outline
        assert!(sql.contains("from footprints fps\n            left join \"uprn\" u"));
    }
}
