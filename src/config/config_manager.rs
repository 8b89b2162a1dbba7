// ==========================================
// 选矿厂生产数据对比系统 - 配置管理器
// ==========================================
// 职责: 对比方案加载、覆写、列举
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::comparison_profile::ComparisonProfile;
use crate::db::open_and_migrate;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

/// 对比方案覆写键前缀
const PROFILE_KEY_PREFIX: &str = "comparison_profile/";

fn profile_key(profile_id: &str) -> String {
    format!("{}{}", PROFILE_KEY_PREFIX, profile_id)
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_and_migrate(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 读取对比方案：优先 config_kv 覆写（comparison_profile/{id}），其次内置预设
    pub fn get_profile(&self, profile_id: &str) -> Result<Option<ComparisonProfile>, Box<dyn Error>> {
        let id = profile_id.trim();
        if id.is_empty() {
            return Ok(None);
        }

        match self.get_global_config_value(&profile_key(id))? {
            Some(raw) => {
                let profile: ComparisonProfile = serde_json::from_str(&raw)?;
                Ok(Some(profile))
            }
            None => Ok(ComparisonProfile::preset(id)),
        }
    }

    /// 保存对比方案（校验通过后写入覆写）
    pub fn save_profile(&self, profile: &ComparisonProfile) -> Result<(), Box<dyn Error>> {
        profile.validate()?;
        let raw = serde_json::to_string(profile)?;
        self.set_global_config_value(&profile_key(&profile.profile_id), &raw)?;
        tracing::info!(profile_id = %profile.profile_id, "对比方案已保存");
        Ok(())
    }

    /// 删除对比方案覆写（内置预设随之恢复）
    ///
    /// # 返回
    /// - true: 存在覆写并已删除
    pub fn delete_profile(&self, profile_id: &str) -> Result<bool, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let affected = conn.execute(
            "DELETE FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![profile_key(profile_id.trim())],
        )?;
        Ok(affected > 0)
    }

    /// 列出全部对比方案（预设 + 覆写，按 profile_id 排序）
    pub fn list_profiles(&self) -> Result<Vec<ComparisonProfile>, Box<dyn Error>> {
        let mut profiles: BTreeMap<String, ComparisonProfile> = ComparisonProfile::presets()
            .into_iter()
            .map(|p| (p.profile_id.clone(), p))
            .collect();

        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' AND key LIKE ?1 ORDER BY key",
        )?;
        let rows = stmt.query_map(params![format!("{}%", PROFILE_KEY_PREFIX)], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            match serde_json::from_str::<ComparisonProfile>(&value) {
                Ok(profile) => {
                    profiles.insert(profile.profile_id.clone(), profile);
                }
                Err(e) => {
                    tracing::warn!(config_key = %key, error = %e, "对比方案覆写格式错误，已忽略");
                }
            }
        }

        Ok(profiles.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::comparison_profile::{SHIFT_PRODUCTION_PROFILE, WEIGHBRIDGE_SHIPMENT_PROFILE};
    use crate::domain::comparison::FieldSpec;

    fn manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        crate::db::ensure_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_global_config_value_upsert() {
        let mgr = manager();
        assert_eq!(mgr.get_global_config_value("locale").unwrap(), None);
        mgr.set_global_config_value("locale", "en").unwrap();
        mgr.set_global_config_value("locale", "zh-CN").unwrap();
        assert_eq!(
            mgr.get_global_config_value("locale").unwrap().as_deref(),
            Some("zh-CN")
        );
    }

    #[test]
    fn test_get_profile_falls_back_to_preset() {
        let mgr = manager();
        let profile = mgr.get_profile(SHIFT_PRODUCTION_PROFILE).unwrap().unwrap();
        assert_eq!(profile, ComparisonProfile::shift_production());
        assert!(mgr.get_profile("missing").unwrap().is_none());
        assert!(mgr.get_profile("  ").unwrap().is_none());
    }

    #[test]
    fn test_save_override_and_delete() {
        let mgr = manager();
        let mut profile = ComparisonProfile::weighbridge_shipment();
        profile.fields.push(FieldSpec::new("杂质(%)", "%"));
        mgr.save_profile(&profile).unwrap();

        let loaded = mgr.get_profile(WEIGHBRIDGE_SHIPMENT_PROFILE).unwrap().unwrap();
        assert_eq!(loaded.fields.len(), profile.fields.len());

        assert!(mgr.delete_profile(WEIGHBRIDGE_SHIPMENT_PROFILE).unwrap());
        assert!(!mgr.delete_profile(WEIGHBRIDGE_SHIPMENT_PROFILE).unwrap());
        let restored = mgr.get_profile(WEIGHBRIDGE_SHIPMENT_PROFILE).unwrap().unwrap();
        assert_eq!(restored, ComparisonProfile::weighbridge_shipment());
    }

    #[test]
    fn test_save_rejects_invalid_profile() {
        let mgr = manager();
        let mut profile = ComparisonProfile::shift_production();
        profile.discriminator_field = String::new();
        assert!(mgr.save_profile(&profile).is_err());
    }

    #[test]
    fn test_list_profiles_merges_custom() {
        let mgr = manager();
        let mut custom = ComparisonProfile::shift_production();
        custom.profile_id = "custom_shift".to_string();
        custom.display_name = "自定义班次对比".to_string();
        mgr.save_profile(&custom).unwrap();

        let ids: Vec<String> = mgr
            .list_profiles()
            .unwrap()
            .into_iter()
            .map(|p| p.profile_id)
            .collect();
        assert_eq!(
            ids,
            vec![
                "custom_shift".to_string(),
                SHIFT_PRODUCTION_PROFILE.to_string(),
                WEIGHBRIDGE_SHIPMENT_PROFILE.to_string(),
            ]
        );
    }
}
