use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Referral Hub API",
        description = "员工推荐奖励系统：管理端与员工端接口文档",
        version = "1.0.0",
        contact(
            name = "API Support",
            email = "support@company.com"
        )
    ),
    paths(
        // System health check
        crate::api::health,
        // Auth endpoints
        crate::api::auth_controller::admin_login,
        crate::api::auth_controller::staff_login,
        crate::api::auth_controller::refresh_token,
        crate::api::auth_controller::forgot_password,
        crate::api::auth_controller::reset_password,
        crate::api::auth_controller::logout,
        crate::api::auth_controller::me,
        // Admin dashboard
        crate::api::admin::dashboard_controller::stats,
        crate::api::admin::dashboard_controller::charts,
        crate::api::admin::dashboard_controller::recent,
        crate::api::admin::dashboard_controller::alerts,
        // Admin users
        crate::api::admin::user_controller::list_users,
        crate::api::admin::user_controller::get_user,
        crate::api::admin::user_controller::user_referrals,
        crate::api::admin::user_controller::user_transactions,
        crate::api::admin::user_controller::update_user,
        crate::api::admin::user_controller::deactivate_user,
        crate::api::admin::user_controller::activate_user,
        crate::api::admin::user_controller::delete_user,
        // Admin referrals
        crate::api::admin::referral_controller::list_referrals,
        crate::api::admin::referral_controller::referral_stats,
        crate::api::admin::referral_controller::get_referral,
        crate::api::admin::referral_controller::update_referral_status,
        // Admin withdrawals
        crate::api::admin::withdrawal_controller::list_withdrawals,
        crate::api::admin::withdrawal_controller::pending_count,
        crate::api::admin::withdrawal_controller::get_withdrawal,
        crate::api::admin::withdrawal_controller::approve_withdrawal,
        crate::api::admin::withdrawal_controller::reject_withdrawal,
        crate::api::admin::withdrawal_controller::process_withdrawal,
        crate::api::admin::withdrawal_controller::complete_withdrawal,
        crate::api::admin::withdrawal_controller::export_withdrawals,
        // Admin points
        crate::api::admin::points_controller::points_config,
        crate::api::admin::points_controller::update_rate,
        crate::api::admin::points_controller::schedule_rate,
        crate::api::admin::points_controller::delete_scheduled_rate,
        crate::api::admin::points_controller::adjust_user_points,
        crate::api::admin::points_controller::points_history,
        crate::api::admin::points_controller::transactions,
        // Admin audit & reports
        crate::api::admin::audit_controller::list_audit_logs,
        crate::api::admin::audit_controller::get_audit_log,
        crate::api::admin::audit_controller::create_audit_log,
        crate::api::admin::audit_controller::list_reports,
        crate::api::admin::audit_controller::create_report,
        crate::api::admin::audit_controller::get_report,
        crate::api::admin::audit_controller::schedule_report,
        crate::api::admin::audit_controller::delete_report,
        // Admin settings, override & admin accounts
        crate::api::admin::settings_controller::get_settings,
        crate::api::admin::settings_controller::update_timezone,
        crate::api::admin::settings_controller::update_currency,
        crate::api::admin::settings_controller::update_features,
        crate::api::admin::settings_controller::update_retention,
        crate::api::admin::settings_controller::update_withdrawal_limits,
        crate::api::admin::settings_controller::perform_override,
        crate::api::admin::settings_controller::list_overrides,
        crate::api::admin::settings_controller::list_admins,
        crate::api::admin::settings_controller::create_admin,
        crate::api::admin::settings_controller::update_admin,
        // Staff portal
        crate::api::staff::dashboard_controller::dashboard,
        crate::api::staff::dashboard_controller::referral_code,
        crate::api::staff::dashboard_controller::regenerate_referral_code,
        crate::api::staff::referral_controller::my_referrals,
        crate::api::staff::referral_controller::my_referral_stats,
        crate::api::staff::referral_controller::my_referral,
        crate::api::staff::referral_controller::send_invite,
        crate::api::staff::points_controller::balance,
        crate::api::staff::points_controller::history,
        crate::api::staff::points_controller::conversion_rate,
        crate::api::staff::withdrawal_controller::my_withdrawals,
        crate::api::staff::withdrawal_controller::create_withdrawal,
        crate::api::staff::withdrawal_controller::withdrawal_limits,
        crate::api::staff::withdrawal_controller::my_withdrawal,
        crate::api::staff::withdrawal_controller::cancel_withdrawal,
        crate::api::staff::account_controller::hours,
        crate::api::staff::account_controller::hours_sync_status,
        crate::api::staff::account_controller::notifications,
        crate::api::staff::account_controller::mark_read,
        crate::api::staff::account_controller::mark_all_read,
        crate::api::staff::account_controller::profile,
        crate::api::staff::account_controller::update_profile,
        crate::api::staff::account_controller::update_password,
        crate::api::staff::account_controller::update_avatar,
        crate::api::staff::account_controller::faq,
        crate::api::staff::account_controller::submit_support_request,
    ),
    components(
        schemas(
            // Database models
            database::staff::model::StaffUser,
            database::staff::model::StaffHours,
            database::staff::model::StaffSortField,
            database::admin::model::AdminRole,
            database::admin::model::AdminPermission,
            database::referral::model::Referral,
            database::referral::model::ReferralStatus,
            database::referral::model::ReferralStats,
            database::points::model::PointTransaction,
            database::points::model::TransactionType,
            database::withdrawal::model::Withdrawal,
            database::withdrawal::model::WithdrawalStatus,
            database::rate::model::ConversionRate,
            database::rate::model::RateStatus,
            database::audit::model::AuditLog,
            database::notification::model::Notification,
            database::notification::model::NotificationType,
            database::report::model::Report,
            database::report::model::ReportType,
            database::report::model::ReportSchedule,
            database::settings::model::SystemSettings,
            database::settings::model::FeatureFlags,
            database::overrides::model::OverrideRecord,
            database::overrides::model::OverrideAction,
            database::support::model::FaqEntry,
            database::support::model::SupportRequest,
            database::pagination::PageMeta,
            database::pagination::SortOrder,
            // Auth DTOs
            crate::dtos::auth_dto::LoginRequest,
            crate::dtos::auth_dto::RefreshTokenRequest,
            crate::dtos::auth_dto::ForgotPasswordRequest,
            crate::dtos::auth_dto::ForgotPasswordResponse,
            crate::dtos::auth_dto::ResetPasswordRequest,
            crate::dtos::auth_dto::AdminSummary,
            crate::dtos::auth_dto::StaffSummary,
            crate::dtos::auth_dto::TokenResponse,
            // Common DTOs
            crate::dtos::common::PaginationQuery,
            crate::dtos::common::CountData,
            // Dashboard DTOs
            crate::dtos::dashboard_dto::DashboardStats,
            crate::dtos::dashboard_dto::UserCounts,
            crate::dtos::dashboard_dto::WithdrawalCounts,
            crate::dtos::dashboard_dto::DashboardCharts,
            crate::dtos::dashboard_dto::MonthlyCount,
            crate::dtos::dashboard_dto::MonthlyAmount,
            crate::dtos::dashboard_dto::TopPerformer,
            crate::dtos::dashboard_dto::DepartmentShare,
            crate::dtos::dashboard_dto::ActivityItem,
            crate::dtos::dashboard_dto::DashboardAlert,
            // User DTOs
            crate::dtos::user_dto::UserStatusFilter,
            crate::dtos::user_dto::UpdateUserRequest,
            crate::dtos::user_dto::UserDetail,
            // Referral DTOs
            crate::dtos::referral_dto::UpdateReferralStatusRequest,
            crate::dtos::referral_dto::SendInviteRequest,
            // Withdrawal DTOs
            crate::dtos::withdrawal_dto::RejectWithdrawalRequest,
            crate::dtos::withdrawal_dto::ExportFormat,
            crate::dtos::withdrawal_dto::ExportWithdrawalsRequest,
            crate::dtos::withdrawal_dto::WithdrawalView,
            crate::dtos::withdrawal_dto::CreateWithdrawalRequest,
            crate::dtos::withdrawal_dto::WithdrawalLimits,
            // Points DTOs
            crate::dtos::points_dto::RateView,
            crate::dtos::points_dto::PointsConfig,
            crate::dtos::points_dto::UpdateRateRequest,
            crate::dtos::points_dto::ScheduleRateRequest,
            crate::dtos::points_dto::AdjustmentKind,
            crate::dtos::points_dto::AdjustPointsRequest,
            crate::dtos::points_dto::AdjustPointsResponse,
            // Audit & report DTOs
            crate::dtos::audit_dto::CreateAuditLogRequest,
            crate::dtos::audit_dto::CreateReportRequest,
            crate::dtos::audit_dto::ScheduleReportRequest,
            // Settings DTOs
            crate::dtos::settings_dto::UpdateTimezoneRequest,
            crate::dtos::settings_dto::UpdateCurrencyRequest,
            crate::dtos::settings_dto::UpdateFeaturesRequest,
            crate::dtos::settings_dto::UpdateRetentionRequest,
            crate::dtos::settings_dto::UpdateWithdrawalLimitsRequest,
            crate::dtos::settings_dto::OverrideRequest,
            crate::dtos::settings_dto::OverrideResponse,
            crate::dtos::settings_dto::CreateAdminRequest,
            crate::dtos::settings_dto::UpdateAdminRequest,
            // Staff DTOs
            crate::dtos::staff_dto::StaffStats,
            crate::dtos::staff_dto::StaffDashboard,
            crate::dtos::staff_dto::ReferralCodeResponse,
            crate::dtos::staff_dto::PointsBalance,
            crate::dtos::staff_dto::ConversionRateInfo,
            crate::dtos::staff_dto::HoursSyncStatus,
            crate::dtos::staff_dto::NotificationList,
            crate::dtos::staff_dto::MarkAllReadResponse,
            crate::dtos::staff_dto::UpdateProfileRequest,
            crate::dtos::staff_dto::UpdatePasswordRequest,
            crate::dtos::staff_dto::AvatarRequest,
            crate::dtos::staff_dto::AvatarResponse,
            crate::dtos::staff_dto::SupportRequestBody,
        )
    ),
    tags(
        (name = "系统状态", description = "系统健康检查和状态监控"),
        (name = "auth", description = "登录、令牌刷新与密码重置"),
        (name = "admin-dashboard", description = "管理端仪表盘"),
        (name = "admin-users", description = "员工管理"),
        (name = "admin-referrals", description = "推荐审核"),
        (name = "admin-withdrawals", description = "提现审核与打款"),
        (name = "admin-points", description = "积分与汇率配置"),
        (name = "admin-audit", description = "审计日志"),
        (name = "admin-reports", description = "报表"),
        (name = "admin-settings", description = "系统设置、越权操作与管理员账号"),
        (name = "staff", description = "员工端")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_lists_both_portals() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/api/v1/auth/login/admin"));
        assert!(paths.contains_key("/api/v1/admin/withdrawals/{id}/approve"));
        assert!(paths.contains_key("/api/v1/staff/withdrawals"));
        assert!(paths.contains_key("/api/v1/admin/override"));
    }
}
