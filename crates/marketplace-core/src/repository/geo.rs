//! 距离计算 SQL 片段

/// 地球半径（千米）
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// 生成 haversine 球面距离（千米）表达式
///
/// `lat`/`lng` 为列名，`lat_param`/`lng_param` 为占位符（如 `$1`）
pub fn haversine_km(lat: &str, lng: &str, lat_param: &str, lng_param: &str) -> String {
    format!(
        "(2 * {EARTH_RADIUS_KM} * ASIN(SQRT(\
            POWER(SIN(RADIANS({lat} - {lat_param}::float8) / 2), 2) + \
            COS(RADIANS({lat_param}::float8)) * COS(RADIANS({lat})) * \
            POWER(SIN(RADIANS({lng} - {lng_param}::float8) / 2), 2))))"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 与 SQL 片段相同的公式，用于校验常量与量级
    fn haversine_distance_km(from: (f64, f64), to: (f64, f64)) -> f64 {
        let (lat1, lng1) = (from.0.to_radians(), from.1.to_radians());
        let (lat2, lng2) = (to.0.to_radians(), to.1.to_radians());
        let a = ((lat2 - lat1) / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * ((lng2 - lng1) / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }

    #[test]
    fn test_sql_fragment_uses_params() {
        let sql = haversine_km("p.latitude", "p.longitude", "$1", "$2");
        assert!(sql.contains("p.latitude - $1::float8"));
        assert!(sql.contains("p.longitude - $2::float8"));
        assert!(sql.contains("6371"));
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let km = haversine_distance_km((48.0, 2.0), (49.0, 2.0));
        assert!((km - 111.19).abs() < 0.1, "got {km}");
        assert_eq!(haversine_distance_km((10.0, 10.0), (10.0, 10.0)), 0.0);
    }
}
