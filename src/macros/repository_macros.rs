/// Pool-backed repository boilerplate: constructor, connection checkout and a redacted `Debug`.
#[macro_export]
macro_rules! impl_pooled_repository {
    ($repo:ident) => {
        pub struct $repo {
            pool: $crate::infra::db::mysql::MySqlPool,
        }

        impl $repo {
            pub fn new(pool: $crate::infra::db::mysql::MySqlPool) -> Self {
                Self { pool }
            }

            fn conn(
                &self,
            ) -> $crate::domain::model::AppResult<$crate::infra::db::mysql::MySqlPooledConnection>
            {
                self.pool
                    .get()
                    .map_err($crate::domain::model::AppError::from)
            }
        }

        impl std::fmt::Debug for $repo {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_struct(stringify!($repo))
                    .field("pool", &"<redacted>")
                    .finish()
            }
        }
    };
}
