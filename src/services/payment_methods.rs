//! PaymentMethods Services, admins manage the ways customers pay for repairs

use models::*;
use repos::ReposFactory;
use services::types::ServiceResult;
use services::Service;

pub trait PaymentMethodsService {
    /// Creates payment method, admins only
    fn create_payment_method(&self, payload: NewPaymentMethod) -> ServiceResult<PaymentMethod>;
    /// Returns payment method by id, admins only
    fn get_payment_method(&self, payment_method_id: PaymentMethodId) -> ServiceResult<Option<PaymentMethod>>;
    /// Returns all payment methods, for any signed in user
    fn list_payment_methods(&self) -> ServiceResult<Vec<PaymentMethod>>;
    /// Updates payment method, admins only
    fn update_payment_method(
        &self,
        payment_method_id: PaymentMethodId,
        payload: UpdatePaymentMethod,
    ) -> ServiceResult<Option<PaymentMethod>>;
    /// Deletes payment method, admins only
    fn delete_payment_method(&self, payment_method_id: PaymentMethodId) -> ServiceResult<Option<PaymentMethod>>;
}

impl<F: ReposFactory> PaymentMethodsService for Service<F> {
    fn create_payment_method(&self, payload: NewPaymentMethod) -> ServiceResult<PaymentMethod> {
        let user_id = self.dynamic_context.user_id;
        let payment_methods_repo = self.static_context.repo_factory.create_payment_methods_repo(user_id);

        self.check_admin()
            .and_then(|_| PaymentMethod::new(payload))
            .and_then(|payment_method| payment_methods_repo.create(payment_method))
            .map(|payment_method| {
                info!("Payment method {} ({}) created.", payment_method.id, payment_method.name);
                payment_method
            })
            .map_err(|e| e.context("Service PaymentMethods, create endpoint error occurred.").into())
    }

    fn get_payment_method(&self, payment_method_id: PaymentMethodId) -> ServiceResult<Option<PaymentMethod>> {
        let user_id = self.dynamic_context.user_id;
        let payment_methods_repo = self.static_context.repo_factory.create_payment_methods_repo(user_id);

        self.check_admin()
            .and_then(|_| payment_methods_repo.get(payment_method_id))
            .map_err(|e| e.context("Service PaymentMethods, get endpoint error occurred.").into())
    }

    fn list_payment_methods(&self) -> ServiceResult<Vec<PaymentMethod>> {
        let user_id = self.dynamic_context.user_id;
        let payment_methods_repo = self.static_context.repo_factory.create_payment_methods_repo(user_id);

        self.current_user()
            .and_then(|_| payment_methods_repo.list())
            .map_err(|e| e.context("Service PaymentMethods, list endpoint error occurred.").into())
    }

    fn update_payment_method(
        &self,
        payment_method_id: PaymentMethodId,
        payload: UpdatePaymentMethod,
    ) -> ServiceResult<Option<PaymentMethod>> {
        let user_id = self.dynamic_context.user_id;
        let payment_methods_repo = self.static_context.repo_factory.create_payment_methods_repo(user_id);

        self.check_admin()
            .and_then(|_| payment_methods_repo.get(payment_method_id))
            .and_then(|payment_method| match payment_method {
                Some(mut payment_method) => {
                    payment_method.apply(payload)?;
                    payment_methods_repo.update(payment_method).map(Some)
                }
                None => Ok(None),
            })
            .map_err(|e| e.context("Service PaymentMethods, update endpoint error occurred.").into())
    }

    fn delete_payment_method(&self, payment_method_id: PaymentMethodId) -> ServiceResult<Option<PaymentMethod>> {
        let user_id = self.dynamic_context.user_id;
        let payment_methods_repo = self.static_context.repo_factory.create_payment_methods_repo(user_id);

        self.check_admin()
            .and_then(|_| payment_methods_repo.delete(payment_method_id))
            .map(|payment_method| {
                if payment_method.is_some() {
                    info!("Payment method {} deleted.", payment_method_id);
                }
                payment_method
            })
            .map_err(|e| e.context("Service PaymentMethods, delete endpoint error occurred.").into())
    }
}
